use async_trait::async_trait;
use nlq_core::SchemaSnapshot;

/// Prefix a generator uses to report that it could not produce SQL.
pub const ERROR_SENTINEL: &str = "Error:";

#[async_trait]
pub trait SqlGenerator: Send + Sync {
    /// Produce a single SQL statement answering `question` over `schema`.
    ///
    /// Text starting with [`ERROR_SENTINEL`] (any case) is a failure report,
    /// not SQL.
    async fn generate(&self, question: &str, schema: &SchemaSnapshot) -> anyhow::Result<String>;
}

/// Whether generator output is the error sentinel rather than SQL.
pub fn is_error_sentinel(text: &str) -> bool {
    let text = text.trim_start();
    text.get(..ERROR_SENTINEL.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(ERROR_SENTINEL))
}

/// Stub generator: always answers with the same statement.
pub struct FixedSqlGenerator {
    sql: String,
}

impl FixedSqlGenerator {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }
}

#[async_trait]
impl SqlGenerator for FixedSqlGenerator {
    async fn generate(&self, _question: &str, _schema: &SchemaSnapshot) -> anyhow::Result<String> {
        Ok(self.sql.clone())
    }
}
