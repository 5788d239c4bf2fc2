//! CLI command implementations.

pub mod ask;
pub mod check;
pub mod serve;
