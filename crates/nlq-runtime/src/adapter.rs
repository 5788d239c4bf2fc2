use async_trait::async_trait;
use nlq_core::{Row, SchemaSnapshot};
use nlq_guard::PagedStatement;

#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Load `CREATE TABLE` text for every table, or only for `table`.
    ///
    /// An unknown `table` yields an empty snapshot rather than an error.
    async fn fetch_schema(&self, table: Option<&str>) -> anyhow::Result<SchemaSnapshot>;
}

#[async_trait]
pub trait RowStore: Send + Sync {
    /// Execute a paged, already vetted statement and return its rows in
    /// result order. Must return at most `statement.limit` rows.
    async fn fetch_page(&self, statement: &PagedStatement) -> anyhow::Result<Vec<Row>>;
}
