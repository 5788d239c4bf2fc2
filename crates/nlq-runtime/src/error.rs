//! Pipeline error kinds.

use nlq_core::{ErrorResponse, RequestError};
use nlq_guard::Rejection;
use thiserror::Error;

/// Message reported when no schema could be loaded.
pub const SCHEMA_UNAVAILABLE: &str = "Failed to retrieve database schema.";

/// Every way a pipeline run can end without results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The schema source failed or returned no tables.
    #[error("Failed to retrieve database schema.")]
    SchemaUnavailable,

    /// The generator reported an error, failed, or timed out.
    #[error("{message}")]
    GenerationFailure { message: String },

    /// The security gate refused the generated SQL.
    #[error("{}", rejection.message())]
    SecurityRejection {
        rejection: Rejection,
        generated_sql: String,
    },

    /// The database refused or failed to run the statement.
    #[error("Database execution error: {detail}")]
    ExecutionFailure {
        detail: String,
        generated_sql: String,
    },

    /// The request itself was invalid.
    #[error("{reason}")]
    MalformedRequest { reason: String },
}

impl QueryError {
    /// SQL produced before the failure, if generation got that far.
    pub fn generated_sql(&self) -> Option<&str> {
        match self {
            Self::SecurityRejection { generated_sql, .. }
            | Self::ExecutionFailure { generated_sql, .. } => Some(generated_sql),
            _ => None,
        }
    }

    /// Whether this failure produced a query log entry.
    pub fn is_logged(&self) -> bool {
        matches!(self, Self::ExecutionFailure { .. })
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            generated_sql: self.generated_sql().map(str::to_string),
        }
    }
}

/// Failures of a direct schema lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Table '{table}' not found.")]
    TableNotFound { table: String },

    #[error("schema source failed: {0}")]
    Source(String),
}

impl From<RequestError> for QueryError {
    fn from(err: RequestError) -> Self {
        Self::MalformedRequest {
            reason: err.to_string(),
        }
    }
}

impl From<QueryError> for ErrorResponse {
    fn from(err: QueryError) -> Self {
        err.to_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_security_rejection_response() {
        let err = QueryError::SecurityRejection {
            rejection: Rejection::ForbiddenField,
            generated_sql: "SELECT password FROM student".to_string(),
        };
        assert_eq!(
            err.to_response(),
            ErrorResponse {
                error: "Security check failed: Query attempts to access forbidden fields."
                    .to_string(),
                generated_sql: Some("SELECT password FROM student".to_string()),
            }
        );
        assert!(!err.is_logged());
    }

    #[test]
    fn test_execution_failure_message() {
        let err = QueryError::ExecutionFailure {
            detail: "Unknown column 'nme' in 'field list'".to_string(),
            generated_sql: "SELECT nme FROM student".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Database execution error: Unknown column 'nme' in 'field list'"
        );
        assert!(err.is_logged());
    }

    #[test]
    fn test_schema_and_request_errors_carry_no_sql() {
        assert_eq!(QueryError::SchemaUnavailable.to_string(), SCHEMA_UNAVAILABLE);
        assert_eq!(QueryError::SchemaUnavailable.generated_sql(), None);

        let err: QueryError = RequestError::EmptyQuestion.into();
        assert_eq!(
            ErrorResponse::from(err),
            ErrorResponse {
                error: "Prompt 'question' is required.".to_string(),
                generated_sql: None,
            }
        );
    }
}
