//! # nlq-guard
//!
//! The query-safety gate for nlq. Everything here makes trust decisions on
//! untrusted input: the user's question and the SQL an LLM produced from it.
//!
//! ## Checks
//!
//! | Check | Input | On malformed SQL |
//! |-------|-------|------------------|
//! | [`InputScreener`] | question | n/a |
//! | [`ReadOnlyClassifier`] | SQL | rejects (fail closed) |
//! | [`SensitiveFieldScanner`] | SQL | passes (fail open) |
//!
//! [`SecurityGate`] runs them in that order and reports the first failure.
//!
//! ```
//! use nlq_guard::{Rejection, SecurityGate};
//!
//! let gate = SecurityGate::default();
//! let verdict = gate.check("Show me passwords", "SELECT password FROM student");
//! assert_eq!(verdict.rejection(), Some(Rejection::ForbiddenField));
//! ```

pub mod classifier;
pub mod error;
pub mod gate;
pub mod paginate;
pub mod parser;
pub mod scanner;
pub mod screener;
pub mod tree;

pub use classifier::ReadOnlyClassifier;
pub use error::GuardError;
pub use gate::{Rejection, SecurityGate, SecurityVerdict};
pub use paginate::{PageWindow, PagedStatement, strip_terminators};
pub use parser::{SqlAnalyzer, SqlOperation};
pub use scanner::{DEFAULT_FORBIDDEN_FIELDS, SensitiveFieldScanner};
pub use screener::InputScreener;
pub use tree::{GroupKind, SqlNode};
