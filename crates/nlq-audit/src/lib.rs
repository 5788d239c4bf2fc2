//! # nlq-audit
//!
//! Append-only query log for nlq.
//!
//! Every question whose SQL reached the database gets exactly one entry,
//! whether the database accepted it or not. Requests refused before
//! execution (generation failures, security rejections) are not recorded.
//!
//! ## Backends
//!
//! | Backend | Output |
//! |---------|--------|
//! | [`MemoryLog`] | process memory |
//! | [`ConsoleLog`] | memory + human-readable stdout lines |
//! | [`FileLog`] | JSON Lines file + memory mirror |
//! | [`DualLog`] | JSON Lines file + stdout |
//!
//! ## Example Usage
//!
//! ```rust
//! use nlq_audit::{LogStatus, QueryLogger};
//!
//! # async fn example() -> Result<(), nlq_audit::AuditError> {
//! let logger = QueryLogger::in_memory();
//! logger.log_success("List all courses", "SELECT title FROM course").await?;
//!
//! let entries = logger.entries().await?;
//! assert_eq!(entries[0].status, LogStatus::Success);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod event;
pub mod logger;
pub mod storage;

pub use error::AuditError;
pub use event::{LogStatus, QueryLogEntry};
pub use logger::QueryLogger;
pub use storage::{ConsoleLog, DualLog, FileLog, MemoryLog, QueryLog, create_log};
