//! Error types for the guard crate.

use thiserror::Error;

/// Errors raised while analyzing generated SQL.
#[derive(Debug, Error)]
pub enum GuardError {
    /// SQL parsing failed.
    #[error("failed to parse SQL: {0}")]
    ParseError(String),

    /// The text held no statement at all.
    #[error("no SQL statement found")]
    EmptyStatement,

    /// Paging needs exactly one SELECT query.
    #[error("expected a single SELECT query, found {0}")]
    NotPageable(String),
}
