//! Sensitive-field detection over the lowered SQL tree.

use crate::parser::SqlAnalyzer;
use crate::tree::SqlNode;
use std::collections::HashSet;

/// Column names rejected when no configuration is supplied.
pub const DEFAULT_FORBIDDEN_FIELDS: [&str; 4] = ["password", "salary", "ssn", "credentials"];

/// Finds references to denylisted columns anywhere in a statement.
#[derive(Clone)]
pub struct SensitiveFieldScanner {
    analyzer: SqlAnalyzer,
    forbidden: HashSet<String>,
}

impl Default for SensitiveFieldScanner {
    fn default() -> Self {
        Self::new(DEFAULT_FORBIDDEN_FIELDS)
    }
}

impl SensitiveFieldScanner {
    /// Create a scanner for the given field names (matched case-insensitively).
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            analyzer: SqlAnalyzer::new(),
            forbidden: fields
                .into_iter()
                .map(|f| f.as_ref().trim().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }

    pub fn is_forbidden(&self, name: &str) -> bool {
        self.forbidden.contains(&name.to_lowercase())
    }

    /// First forbidden column referenced by `sql`, in statement order.
    ///
    /// Unparsable SQL yields `None`; read-only classification runs first and
    /// already rejects it.
    pub fn find_forbidden(&self, sql: &str) -> Option<String> {
        let statements = self.analyzer.parse(sql).ok()?;
        let tree = SqlNode::lower(&statements);

        let hit = tree.iter().find_map(|root| {
            root.find(&mut |node| {
                matches!(node, SqlNode::Identifier { name, .. } if self.is_forbidden(name))
            })
        })?;

        match hit {
            SqlNode::Identifier { name, .. } => {
                tracing::warn!(field = %name, sql = %sql, "Rejected query referencing forbidden field");
                Some(name.clone())
            }
            _ => None,
        }
    }

    pub fn contains_forbidden_fields(&self, sql: &str) -> bool {
        self.find_forbidden(sql).is_some()
    }
}
