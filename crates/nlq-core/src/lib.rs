use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Configuration types shared across all nlq crates
pub mod config;

// Re-export commonly used config types for convenience
pub use config::{
    AuditBackend, AuditConfig, DatabaseConfig, LlmConfig, NlqConfig, PageStrategy,
    PaginationConfig, SecurityConfig, ServerConfig,
};

/// One result record: column name -> value, in select-list order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Table name -> `CREATE TABLE` text.
pub type SchemaSnapshot = BTreeMap<String, String>;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A validated natural-language query request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    question: String,
    page_size: u32,
    offset: u64,
}

/// Reasons a request cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Prompt 'question' is required.")]
    EmptyQuestion,

    #[error("page_size must be a positive integer")]
    ZeroPageSize,

    #[error("page_size {requested} exceeds the maximum of {max}")]
    PageSizeTooLarge { requested: u32, max: u32 },
}

impl QueryRequest {
    pub fn new(
        question: impl Into<String>,
        page_size: u32,
        offset: u64,
    ) -> Result<Self, RequestError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(RequestError::EmptyQuestion);
        }
        if page_size == 0 {
            return Err(RequestError::ZeroPageSize);
        }
        Ok(Self {
            question,
            page_size,
            offset,
        })
    }

    /// Request for the first page with the default page size.
    pub fn first_page(question: impl Into<String>) -> Result<Self, RequestError> {
        Self::new(question, DEFAULT_PAGE_SIZE, 0)
    }

    /// Reject page sizes above `max`.
    pub fn ensure_page_size_at_most(&self, max: u32) -> Result<(), RequestError> {
        if self.page_size > max {
            return Err(RequestError::PageSizeTooLarge {
                requested: self.page_size,
                max,
            });
        }
        Ok(())
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub rows: Vec<Row>,
    /// Offset of the following page; set only when this page is full.
    pub next_offset: Option<u64>,
}

impl ResultPage {
    /// Build a page using the full-page heuristic: a page holding exactly
    /// `page_size` rows is assumed to have a successor. No successor exists
    /// past the end of the offset range.
    pub fn from_rows(rows: Vec<Row>, page_size: u32, offset: u64) -> Self {
        let next_offset = if rows.len() == page_size as usize {
            offset.checked_add(u64::from(page_size))
        } else {
            None
        };
        Self { rows, next_offset }
    }

    pub fn has_more(&self) -> bool {
        self.next_offset.is_some()
    }
}

/// Successful pipeline response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub generated_sql: String,
    pub data: Vec<Row>,
    pub next_offset: Option<u64>,
}

impl QueryResponse {
    pub fn new(generated_sql: impl Into<String>, page: ResultPage) -> Self {
        Self {
            generated_sql: generated_sql.into(),
            data: page.rows,
            next_offset: page.next_offset,
        }
    }
}

/// Failed pipeline response. `generated_sql` is present once generation succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_sql: Option<String>,
}
