//! Query log backends.

use crate::error::AuditError;
use crate::event::QueryLogEntry;
use async_trait::async_trait;
use nlq_core::config::audit::{AuditBackend, AuditConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// Append-only sink for query log entries.
///
/// Implementations must make each `append` atomic with respect to
/// concurrent appends and must never drop or reorder stored entries.
#[async_trait]
pub trait QueryLog: Send + Sync {
    /// Store an entry.
    async fn append(&self, entry: QueryLogEntry) -> Result<(), AuditError>;

    /// All entries recorded during this process lifetime, oldest first.
    async fn entries(&self) -> Result<Vec<QueryLogEntry>, AuditError>;
}

/// Create a log backend based on configuration.
pub fn create_log(config: &AuditConfig) -> Result<Box<dyn QueryLog>, AuditError> {
    match (config.backend, config.stdout) {
        (AuditBackend::Memory, false) => Ok(Box::new(MemoryLog::new())),
        (AuditBackend::Memory, true) => Ok(Box::new(ConsoleLog::new())),
        (AuditBackend::File, false) => Ok(Box::new(FileLog::new(&config.file_path)?)),
        (AuditBackend::File, true) => Ok(Box::new(DualLog::new(&config.file_path)?)),
    }
}

/// Process-lifetime, in-memory log.
#[derive(Default)]
pub struct MemoryLog {
    entries: RwLock<Vec<QueryLogEntry>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: QueryLogEntry) -> Result<(), AuditError> {
        self.entries
            .write()
            .map_err(|e| AuditError::StorageError(format!("Failed to acquire write lock: {}", e)))?
            .push(entry);
        Ok(())
    }

    fn snapshot(&self) -> Result<Vec<QueryLogEntry>, AuditError> {
        let entries = self.entries.read().map_err(|e| {
            AuditError::StorageError(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(entries.clone())
    }
}

#[async_trait]
impl QueryLog for MemoryLog {
    async fn append(&self, entry: QueryLogEntry) -> Result<(), AuditError> {
        self.push(entry)
    }

    async fn entries(&self) -> Result<Vec<QueryLogEntry>, AuditError> {
        self.snapshot()
    }
}

/// In-memory log that also prints each entry as a readable line.
#[derive(Default)]
pub struct ConsoleLog {
    inner: MemoryLog,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryLog for ConsoleLog {
    async fn append(&self, entry: QueryLogEntry) -> Result<(), AuditError> {
        println!("{}", entry.to_log_line());
        self.inner.push(entry)
    }

    async fn entries(&self) -> Result<Vec<QueryLogEntry>, AuditError> {
        self.inner.snapshot()
    }
}

/// Appends entries to a JSON Lines file and mirrors them in memory.
pub struct FileLog {
    path: PathBuf,
    // Serializes writers so every line lands whole.
    writer: Mutex<()>,
    mirror: MemoryLog,
}

impl FileLog {
    /// Create a file log, creating the parent directory when missing.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuditError::InitializationFailed(format!(
                    "cannot create log directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(Self {
            path,
            writer: Mutex::new(()),
            mirror: MemoryLog::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QueryLog for FileLog {
    async fn append(&self, entry: QueryLogEntry) -> Result<(), AuditError> {
        let json = serde_json::to_string(&entry)?;
        {
            let _guard = self
                .writer
                .lock()
                .map_err(|e| AuditError::StorageError(format!("Failed to acquire file lock: {}", e)))?;
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            writeln!(file, "{}", json)?;
        }
        self.mirror.push(entry)
    }

    async fn entries(&self) -> Result<Vec<QueryLogEntry>, AuditError> {
        self.mirror.snapshot()
    }
}

/// File log that also prints each entry to stdout.
pub struct DualLog {
    file: FileLog,
}

impl DualLog {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        Ok(Self {
            file: FileLog::new(path)?,
        })
    }
}

#[async_trait]
impl QueryLog for DualLog {
    async fn append(&self, entry: QueryLogEntry) -> Result<(), AuditError> {
        println!("{}", entry.to_log_line());
        self.file.append(entry).await
    }

    async fn entries(&self) -> Result<Vec<QueryLogEntry>, AuditError> {
        self.file.entries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogStatus;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_memory_log_keeps_order() {
        let log = MemoryLog::new();
        log.append(QueryLogEntry::success("first", "SELECT 1"))
            .await
            .unwrap();
        log.append(QueryLogEntry::failure("second", "SELECT x", "unknown column"))
            .await
            .unwrap();

        let entries = log.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].question, "first");
        assert_eq!(entries[1].status, LogStatus::Error);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_all_kept() {
        let log = Arc::new(MemoryLog::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let log = Arc::clone(&log);
            handles.push(tokio::spawn(async move {
                log.append(QueryLogEntry::success(format!("q{i}"), "SELECT 1"))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(log.entries().await.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn test_file_log_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("queries.jsonl");
        let log = FileLog::new(&path).unwrap();

        log.append(QueryLogEntry::success("List all courses", "SELECT title FROM course"))
            .await
            .unwrap();
        log.append(QueryLogEntry::failure("q", "SELECT nope", "boom"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<QueryLogEntry> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].sql, "SELECT title FROM course");
        assert_eq!(lines[1].error_message.as_deref(), Some("boom"));
        assert_eq!(log.entries().await.unwrap(), lines);
    }

    #[tokio::test]
    async fn test_create_log_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuditConfig {
            backend: AuditBackend::File,
            file_path: dir.path().join("q.jsonl").display().to_string(),
            stdout: true,
        };
        let log = create_log(&config).unwrap();
        log.append(QueryLogEntry::success("q", "SELECT 1"))
            .await
            .unwrap();
        assert_eq!(log.entries().await.unwrap().len(), 1);

        let memory = create_log(&AuditConfig::default()).unwrap();
        assert!(memory.entries().await.unwrap().is_empty());
    }
}
