//! Row-window rewriting for vetted SELECT statements.
//!
//! The window is set on the parsed query and the wire SQL is the statement
//! re-rendered from its AST, so trailing comments or terminators in the
//! generated text can never swallow the LIMIT clause.

use crate::error::GuardError;
use crate::parser::{SqlAnalyzer, query_has_row_window};
use sqlparser::ast::{Expr, LimitClause, Offset, OffsetRows, Query, Statement, Value};

/// Alias of the derived table used when the statement already has a window.
const PAGE_ALIAS: &str = "nlq_page";

/// Remove surrounding whitespace and any trailing statement terminators.
pub fn strip_terminators(sql: &str) -> &str {
    let mut trimmed = sql.trim();
    while let Some(rest) = trimmed.strip_suffix(';') {
        trimmed = rest.trim_end();
    }
    trimmed
}

/// A statement with its row window applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedStatement {
    /// Wire SQL including the LIMIT/OFFSET clause.
    pub sql: String,
    pub limit: u64,
    pub offset: u64,
}

/// Builds the paged form of a SELECT statement.
#[derive(Clone, Default)]
pub struct PageWindow {
    analyzer: SqlAnalyzer,
}

impl PageWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<sql> LIMIT <limit> OFFSET <offset>`, or the same window over a
    /// derived table when the statement already limits its own rows.
    pub fn apply(&self, sql: &str, limit: u64, offset: u64) -> Result<PagedStatement, GuardError> {
        let mut query = self.single_query(strip_terminators(sql))?;

        if query_has_row_window(&query) {
            let wrapped = format!("SELECT * FROM ({query}) AS {PAGE_ALIAS}");
            query = self.single_query(&wrapped)?;
        }
        query.limit_clause = Some(window_clause(limit, offset));

        Ok(PagedStatement {
            sql: Statement::Query(query).to_string(),
            limit,
            offset,
        })
    }

    fn single_query(&self, sql: &str) -> Result<Box<Query>, GuardError> {
        let mut statements = self.analyzer.parse_non_empty(sql)?;
        if statements.len() > 1 {
            return Err(GuardError::NotPageable(format!(
                "{} statements",
                statements.len()
            )));
        }
        match statements.pop() {
            Some(Statement::Query(query)) => Ok(query),
            Some(other) => Err(GuardError::NotPageable(other.to_string())),
            None => Err(GuardError::EmptyStatement),
        }
    }
}

fn window_clause(limit: u64, offset: u64) -> LimitClause {
    LimitClause::LimitOffset {
        limit: Some(number(limit)),
        offset: Some(Offset {
            value: number(offset),
            rows: OffsetRows::None,
        }),
        limit_by: Vec::new(),
    }
}

fn number(n: u64) -> Expr {
    Expr::value(Value::Number(n.to_string(), false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_terminators() {
        assert_eq!(strip_terminators("SELECT 1;"), "SELECT 1");
        assert_eq!(strip_terminators("  SELECT 1 ; ;\n"), "SELECT 1");
        assert_eq!(strip_terminators("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_plain_select_gets_window() {
        let window = PageWindow::new();
        assert_eq!(
            window.apply("SELECT title FROM course;", 10, 0).unwrap().sql,
            "SELECT title FROM course LIMIT 10 OFFSET 0"
        );
        assert_eq!(
            window
                .apply("SELECT title FROM course ORDER BY title", 10, 20)
                .unwrap()
                .sql,
            "SELECT title FROM course ORDER BY title LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_trailing_comments_do_not_hide_the_window() {
        let window = PageWindow::new();
        assert_eq!(
            window
                .apply("SELECT title FROM course -- every course", 10, 0)
                .unwrap()
                .sql,
            "SELECT title FROM course LIMIT 10 OFFSET 0"
        );
        assert_eq!(
            window
                .apply("SELECT title FROM course; -- done\n", 10, 10)
                .unwrap()
                .sql,
            "SELECT title FROM course LIMIT 10 OFFSET 10"
        );

        let paged = window
            .apply("SELECT title FROM course /* all */ # mysql comment", 5, 0)
            .unwrap();
        let reparsed = SqlAnalyzer::new().parse(&paged.sql).unwrap();
        assert!(SqlAnalyzer::new().has_row_window(&reparsed[0]));
    }

    #[test]
    fn test_window_bounds_are_kept() {
        let paged = PageWindow::new().apply("SELECT 1", 11, 30).unwrap();
        assert_eq!(paged.limit, 11);
        assert_eq!(paged.offset, 30);
    }

    #[test]
    fn test_existing_limit_is_wrapped() {
        let window = PageWindow::new();
        assert_eq!(
            window.apply("SELECT title FROM course LIMIT 5;", 10, 0).unwrap().sql,
            "SELECT * FROM (SELECT title FROM course LIMIT 5) AS nlq_page LIMIT 10 OFFSET 0"
        );
    }

    #[test]
    fn test_non_query_text_is_rejected() {
        let window = PageWindow::new();
        assert!(matches!(
            window.apply("SELECT 1; SELECT 2", 10, 0),
            Err(GuardError::NotPageable(_))
        ));
        assert!(matches!(window.apply("  ;", 10, 0), Err(GuardError::EmptyStatement)));
        assert!(window.apply("SELEC title", 10, 0).is_err());
    }
}
