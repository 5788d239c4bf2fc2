//! Request handlers.

use crate::error::ServerError;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use nlq_core::{QueryResponse, SchemaSnapshot};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use std::str::FromStr;

/// `POST /query` body. `page_size` and `offset` accept JSON integers or
/// integer strings such as `"10"`.
#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub offset: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrText {
    Int(u64),
    Text(String),
}

fn lenient_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + FromStr,
{
    match Option::<IntOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrText::Int(n)) => T::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("{} is out of range", n))),
        Some(IntOrText::Text(text)) => text
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("{:?} is not a non-negative integer", text))),
    }
}

/// `GET /schema` parameters.
#[derive(Debug, Deserialize)]
pub struct SchemaParams {
    pub table_name: Option<String>,
}

// The body is parsed by hand so malformed JSON gets the documented message
// regardless of the request's content type.
pub async fn query(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<QueryResponse>, ServerError> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| ServerError::InvalidJson)?;
    let body: QueryBody = serde_json::from_value(value).map_err(|e| {
        ServerError::InvalidRequest(format!("Invalid request body: {}", e))
    })?;

    let question = body.prompt.unwrap_or_default();
    let page_size = body.page_size.unwrap_or(state.default_page_size);
    let offset = body.offset.unwrap_or(0);

    tracing::info!(question = %question, page_size, offset, "Query received");

    let response = state
        .orchestrator
        .submit_query(&question, page_size, offset)
        .await?;
    Ok(Json(response))
}

pub async fn schema(
    State(state): State<AppState>,
    Query(params): Query<SchemaParams>,
) -> Result<Json<SchemaSnapshot>, ServerError> {
    let table = params.table_name.as_deref().filter(|t| !t.is_empty());
    let schema = state.orchestrator.fetch_schema(table).await?;
    Ok(Json(schema))
}

pub async fn logs(State(state): State<AppState>) -> Result<Json<Value>, ServerError> {
    let entries = state
        .orchestrator
        .fetch_logs()
        .await
        .map_err(|e| ServerError::Internal(e.into()))?;
    Ok(Json(json!({ "logs": entries })))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "nlq-server",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
