//! Error types for the HTTP transport.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nlq_core::ErrorResponse;
use nlq_runtime::{QueryError, SchemaError};
use thiserror::Error;

/// Body text for failures whose detail stays in the server log.
pub const INTERNAL_ERROR: &str = "An internal server error occurred.";

#[derive(Debug, Error)]
pub enum ServerError {
    /// The pipeline refused or failed the query.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Schema lookup failed or named an unknown table.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The request body is not JSON.
    #[error("Invalid JSON format.")]
    InvalidJson,

    /// The request body is JSON but has the wrong shape.
    #[error("{0}")]
    InvalidRequest(String),

    /// Failed to bind or serve.
    #[error("failed to start server: {0}")]
    StartupFailed(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServerError::Query(err) => (StatusCode::BAD_REQUEST, err.to_response()),
            ServerError::Schema(SchemaError::TableNotFound { .. }) => {
                (StatusCode::NOT_FOUND, message(self.to_string()))
            }
            ServerError::InvalidJson | ServerError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, message(self.to_string()))
            }
            _ => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message(INTERNAL_ERROR))
            }
        };

        (status, Json(body)).into_response()
    }
}

fn message(error: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        error: error.into(),
        generated_sql: None,
    }
}
