//! Query logger.
//!
//! Thin front over a [`QueryLog`] backend with one method per outcome the
//! pipeline records.

use nlq_core::AuditConfig;
use std::sync::Arc;

use crate::error::AuditError;
use crate::event::QueryLogEntry;
use crate::storage::{MemoryLog, QueryLog, create_log};

/// The query logger. Cheap to clone; clones share one backend.
#[derive(Clone)]
pub struct QueryLogger {
    storage: Arc<dyn QueryLog>,
}

impl QueryLogger {
    /// Create a logger with the backend selected by `config`.
    pub fn new(config: &AuditConfig) -> Result<Self, AuditError> {
        Ok(Self {
            storage: Arc::from(create_log(config)?),
        })
    }

    /// Create a logger with a custom storage backend.
    pub fn with_storage(storage: Arc<dyn QueryLog>) -> Self {
        Self { storage }
    }

    /// Create an in-memory logger.
    pub fn in_memory() -> Self {
        Self::with_storage(Arc::new(MemoryLog::new()))
    }

    /// Record an entry.
    pub async fn log(&self, entry: QueryLogEntry) -> Result<(), AuditError> {
        tracing::debug!(
            entry_id = %entry.id,
            status = %entry.status,
            question = %entry.question,
            "Query logged"
        );

        self.storage.append(entry).await
    }

    /// Record a query the database executed.
    pub async fn log_success(&self, question: &str, sql: &str) -> Result<(), AuditError> {
        self.log(QueryLogEntry::success(question, sql)).await
    }

    /// Record a query the database refused or failed on.
    pub async fn log_failure(
        &self,
        question: &str,
        sql: &str,
        error: &str,
    ) -> Result<(), AuditError> {
        self.log(QueryLogEntry::failure(question, sql, error)).await
    }

    /// Every entry recorded so far, oldest first.
    pub async fn entries(&self) -> Result<Vec<QueryLogEntry>, AuditError> {
        self.storage.entries().await
    }
}

impl Default for QueryLogger {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogStatus;

    #[tokio::test]
    async fn test_success_and_failure_are_recorded_in_order() {
        let logger = QueryLogger::in_memory();

        logger
            .log_success("List all courses", "SELECT title FROM course")
            .await
            .unwrap();
        logger
            .log_failure(
                "List all rooms",
                "SELECT * FROM rooms",
                "Table 'university.rooms' doesn't exist",
            )
            .await
            .unwrap();

        let entries = logger.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, LogStatus::Success);
        assert_eq!(entries[0].error_message, None);
        assert_eq!(entries[1].status, LogStatus::Error);
        assert_eq!(entries[1].sql, "SELECT * FROM rooms");
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let logger = QueryLogger::default();
        let clone = logger.clone();

        clone.log_success("q", "SELECT 1").await.unwrap();
        assert_eq!(logger.entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_backend_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuditConfig {
            backend: nlq_core::AuditBackend::File,
            file_path: dir.path().join("queries.jsonl").display().to_string(),
            stdout: false,
        };
        let logger = QueryLogger::new(&config).unwrap();
        logger.log_success("q", "SELECT 1").await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("queries.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
