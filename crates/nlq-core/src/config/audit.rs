//! Query log configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the query log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Where log entries are kept.
    #[serde(default)]
    pub backend: AuditBackend,

    /// JSON Lines file (for the file backend).
    #[serde(default = "default_file_path")]
    pub file_path: String,

    /// Also echo each entry to stdout.
    #[serde(default)]
    pub stdout: bool,
}

/// Storage backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditBackend {
    /// Process-lifetime, in memory.
    #[default]
    Memory,
    /// Append to a JSON Lines file.
    File,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: AuditBackend::default(),
            file_path: default_file_path(),
            stdout: false,
        }
    }
}

fn default_file_path() -> String {
    "logs/queries.jsonl".to_string()
}
