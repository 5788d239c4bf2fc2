//! # nlq-runtime
//!
//! The query pipeline: schema fetch, SQL generation, security gate, paged
//! execution and logging.
//!
//! Collaborators sit behind traits so the pipeline never depends on a
//! concrete database or model:
//!
//! - [`SchemaSource`] loads `CREATE TABLE` text
//! - [`SqlGenerator`] turns a question into SQL
//! - [`RowStore`] runs a paged statement
//!
//! [`QueryOrchestrator`] composes them. A run ends in exactly one of a
//! [`QueryResponse`](nlq_core::QueryResponse) or a [`QueryError`]; only runs
//! whose SQL reached the database leave a query log entry.

pub mod adapter;
pub mod error;
pub mod executor;
pub mod generator;
pub mod orchestrator;

pub use adapter::{RowStore, SchemaSource};
pub use error::{QueryError, SCHEMA_UNAVAILABLE, SchemaError};
pub use executor::PaginationExecutor;
pub use generator::{ERROR_SENTINEL, FixedSqlGenerator, SqlGenerator, is_error_sentinel};
pub use orchestrator::QueryOrchestrator;
