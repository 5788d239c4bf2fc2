//! Parser-independent node tree over SQL statements.
//!
//! Statements are lowered into a small tagged tree: groups (statements,
//! queries, parenthesized expressions, function calls, subqueries) holding
//! identifiers and literals. Consumers walk the tree without knowing the
//! parser's AST types.

use sqlparser::ast::{
    Expr, Ident, JoinConstraint, JoinOperator, ObjectName, ObjectNamePart, Query, SetExpr,
    Statement, TableFactor, TableWithJoins, Visit, Visitor,
};
use std::ops::ControlFlow;

/// Kind of grouping construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Statement,
    Query,
    Nested,
    Function,
    Subquery,
}

/// A node of the lowered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlNode {
    Group {
        kind: GroupKind,
        children: Vec<SqlNode>,
    },
    /// A column reference. `name` is the last, unquoted part.
    Identifier {
        qualifier: Vec<String>,
        name: String,
    },
    Literal(String),
}

impl SqlNode {
    fn identifier(parts: &[Ident]) -> Option<Self> {
        let (last, qualifier) = parts.split_last()?;
        Some(SqlNode::Identifier {
            qualifier: qualifier.iter().map(|p| p.value.clone()).collect(),
            name: last.value.clone(),
        })
    }

    fn object_name(name: &ObjectName) -> Option<Self> {
        let parts: Vec<Ident> = name
            .0
            .iter()
            .filter_map(ObjectNamePart::as_ident)
            .cloned()
            .collect();
        Self::identifier(&parts)
    }

    /// Lower parsed statements into one `Statement` group each.
    pub fn lower(statements: &[Statement]) -> Vec<SqlNode> {
        let mut builder = TreeBuilder::default();
        for statement in statements {
            let _ = statement.visit(&mut builder);
        }
        builder.finish()
    }

    /// Depth-first search for the first node satisfying `pred`.
    pub fn find<'a>(&'a self, pred: &mut impl FnMut(&SqlNode) -> bool) -> Option<&'a SqlNode> {
        if pred(self) {
            return Some(self);
        }
        if let SqlNode::Group { children, .. } = self {
            for child in children {
                if let Some(found) = child.find(&mut *pred) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Unqualified names of every identifier below this node, in order.
    pub fn identifier_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            SqlNode::Group { children, .. } => {
                for child in children {
                    child.collect_names(out);
                }
            }
            SqlNode::Identifier { name, .. } => out.push(name),
            SqlNode::Literal(_) => {}
        }
    }
}

/// Builds the tree while the parser's visitor walks the AST.
#[derive(Default)]
struct TreeBuilder {
    roots: Vec<SqlNode>,
    open: Vec<(GroupKind, Vec<SqlNode>)>,
}

impl TreeBuilder {
    fn push(&mut self, node: SqlNode) {
        match self.open.last_mut() {
            Some((_, children)) => children.push(node),
            None => self.roots.push(node),
        }
    }

    fn open(&mut self, kind: GroupKind) {
        self.open.push((kind, Vec::new()));
    }

    fn close(&mut self) {
        if let Some((kind, children)) = self.open.pop() {
            self.push(SqlNode::Group { kind, children });
        }
    }

    fn finish(mut self) -> Vec<SqlNode> {
        while !self.open.is_empty() {
            self.close();
        }
        self.roots
    }
}

/// Column names listed in `JOIN ... USING (...)` clauses of the query's own
/// SELECT bodies. Nested queries report their own when visited.
fn using_columns(query: &Query) -> Vec<&ObjectName> {
    let mut columns = Vec::new();
    collect_body_using(&query.body, &mut columns);
    columns
}

fn collect_body_using<'a>(body: &'a SetExpr, out: &mut Vec<&'a ObjectName>) {
    match body {
        SetExpr::Select(select) => {
            for from in &select.from {
                collect_join_using(from, out);
            }
        }
        SetExpr::SetOperation { left, right, .. } => {
            collect_body_using(left, out);
            collect_body_using(right, out);
        }
        _ => {}
    }
}

fn collect_join_using<'a>(from: &'a TableWithJoins, out: &mut Vec<&'a ObjectName>) {
    collect_factor_using(&from.relation, out);
    for join in &from.joins {
        collect_factor_using(&join.relation, out);
        if let Some(JoinConstraint::Using(columns)) = join_constraint(&join.join_operator) {
            out.extend(columns);
        }
    }
}

fn collect_factor_using<'a>(factor: &'a TableFactor, out: &mut Vec<&'a ObjectName>) {
    if let TableFactor::NestedJoin {
        table_with_joins, ..
    } = factor
    {
        collect_join_using(table_with_joins, out);
    }
}

fn join_constraint(operator: &JoinOperator) -> Option<&JoinConstraint> {
    match operator {
        JoinOperator::Join(c)
        | JoinOperator::Inner(c)
        | JoinOperator::Left(c)
        | JoinOperator::LeftOuter(c)
        | JoinOperator::Right(c)
        | JoinOperator::RightOuter(c)
        | JoinOperator::FullOuter(c)
        | JoinOperator::CrossJoin(c)
        | JoinOperator::Semi(c)
        | JoinOperator::LeftSemi(c)
        | JoinOperator::RightSemi(c)
        | JoinOperator::Anti(c)
        | JoinOperator::LeftAnti(c)
        | JoinOperator::RightAnti(c)
        | JoinOperator::StraightJoin(c) => Some(c),
        JoinOperator::AsOf { constraint, .. } => Some(constraint),
        _ => None,
    }
}

fn group_kind(expr: &Expr) -> Option<GroupKind> {
    match expr {
        Expr::Nested(_) | Expr::Tuple(_) => Some(GroupKind::Nested),
        Expr::Function(_) => Some(GroupKind::Function),
        Expr::Subquery(_) | Expr::InSubquery { .. } | Expr::Exists { .. } => {
            Some(GroupKind::Subquery)
        }
        _ => None,
    }
}

impl Visitor for TreeBuilder {
    type Break = ();

    fn pre_visit_statement(&mut self, _statement: &Statement) -> ControlFlow<Self::Break> {
        self.open(GroupKind::Statement);
        ControlFlow::Continue(())
    }

    fn post_visit_statement(&mut self, _statement: &Statement) -> ControlFlow<Self::Break> {
        self.close();
        ControlFlow::Continue(())
    }

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        self.open(GroupKind::Query);
        for column in using_columns(query) {
            if let Some(node) = SqlNode::object_name(column) {
                self.push(node);
            }
        }
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.close();
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if let Some(kind) = group_kind(expr) {
            self.open(kind);
            return ControlFlow::Continue(());
        }
        match expr {
            Expr::Identifier(ident) => {
                if let Some(node) = SqlNode::identifier(std::slice::from_ref(ident)) {
                    self.push(node);
                }
            }
            Expr::CompoundIdentifier(parts) => {
                if let Some(node) = SqlNode::identifier(parts) {
                    self.push(node);
                }
            }
            Expr::MatchAgainst { columns, .. } => {
                for column in columns {
                    if let Some(node) = SqlNode::object_name(column) {
                        self.push(node);
                    }
                }
            }
            Expr::Value(value) => self.push(SqlNode::Literal(value.to_string())),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn post_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if group_kind(expr).is_some() {
            self.close();
        }
        ControlFlow::Continue(())
    }
}
