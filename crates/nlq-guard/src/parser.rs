//! SQL parsing and statement classification.

use crate::error::GuardError;
use sqlparser::ast::{Query, SetExpr, Statement};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

/// Parses generated SQL in the MySQL dialect.
pub struct SqlAnalyzer {
    dialect: MySqlDialect,
}

impl Clone for SqlAnalyzer {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl Default for SqlAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlAnalyzer {
    /// Create a new SQL analyzer.
    pub fn new() -> Self {
        Self {
            dialect: MySqlDialect {},
        }
    }

    /// Parse a SQL string into statements.
    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>, GuardError> {
        Parser::parse_sql(&self.dialect, sql).map_err(|e| GuardError::ParseError(e.to_string()))
    }

    /// Parse a SQL string that must contain at least one statement.
    pub fn parse_non_empty(&self, sql: &str) -> Result<Vec<Statement>, GuardError> {
        let statements = self.parse(sql)?;
        if statements.is_empty() {
            return Err(GuardError::EmptyStatement);
        }
        Ok(statements)
    }

    /// Get the type of SQL operation.
    pub fn get_operation(&self, stmt: &Statement) -> SqlOperation {
        match stmt {
            Statement::Query(query) if is_select_only(query) => SqlOperation::Select,
            Statement::Query(_) => SqlOperation::Other,
            Statement::Insert { .. } => SqlOperation::Insert,
            Statement::Update { .. } => SqlOperation::Update,
            Statement::Delete { .. } => SqlOperation::Delete,
            Statement::CreateTable { .. }
            | Statement::AlterTable { .. }
            | Statement::Drop { .. }
            | Statement::Truncate { .. }
            | Statement::CreateIndex { .. }
            | Statement::CreateView { .. } => SqlOperation::Ddl,
            _ => SqlOperation::Other,
        }
    }

    /// True when the outermost query already limits or skips rows.
    pub fn has_row_window(&self, stmt: &Statement) -> bool {
        match stmt {
            Statement::Query(query) => query_has_row_window(query),
            _ => false,
        }
    }
}

pub(crate) fn query_has_row_window(query: &Query) -> bool {
    query.limit_clause.is_some() || query.fetch.is_some()
}

/// A query is SELECT-only when every branch of its body and every CTE is a
/// plain SELECT that does not write its result anywhere.
fn is_select_only(query: &Query) -> bool {
    if let Some(with) = &query.with
        && !with.cte_tables.iter().all(|cte| is_select_only(&cte.query))
    {
        return false;
    }
    is_select_body(&query.body)
}

fn is_select_body(body: &SetExpr) -> bool {
    match body {
        SetExpr::Select(select) => select.into.is_none(),
        SetExpr::Query(query) => is_select_only(query),
        SetExpr::SetOperation { left, right, .. } => is_select_body(left) && is_select_body(right),
        _ => false,
    }
}

/// Types of SQL operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOperation {
    Select,
    Insert,
    Update,
    Delete,
    Ddl,
    Other,
}

impl std::fmt::Display for SqlOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Ddl => write!(f, "DDL"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}
