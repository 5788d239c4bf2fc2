//! Configuration types for nlq.
//!
//! All sections are optional in the YAML file; missing fields fall back to
//! their defaults so an empty document is a valid configuration.
//!
//! ```yaml
//! database:
//!   database_url_env: DATABASE_URL
//!   query_timeout_seconds: 30
//! llm:
//!   model: qwen-turbo
//! security:
//!   forbidden_fields: [password, salary, ssn, credentials]
//! pagination:
//!   default_page_size: 10
//!   strategy: full_page
//! server:
//!   listen_port: 8080
//! audit:
//!   backend: file
//!   file_path: logs/queries.jsonl
//! ```

pub mod audit;
pub mod database;
pub mod llm;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use audit::{AuditBackend, AuditConfig};
pub use database::{ConnectionPoolConfig, DatabaseConfig};
pub use llm::LlmConfig;

/// Complete nlq configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NlqConfig {
    /// Database connection used for schema fetches and query execution.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// SQL generator settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Security gate settings.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Paging behaviour.
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Query log settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Security gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Column names that generated SQL must never reference (case-insensitive).
    #[serde(default = "default_forbidden_fields")]
    pub forbidden_fields: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            forbidden_fields: default_forbidden_fields(),
        }
    }
}

/// How the executor decides whether another page exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStrategy {
    /// Fetch `page_size` rows; a full page implies a next page.
    #[default]
    FullPage,
    /// Fetch `page_size + 1` rows and drop the extra one.
    OverFetch,
}

/// Pagination configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    #[serde(default)]
    pub strategy: PageStrategy,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            strategy: PageStrategy::default(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Allow cross-origin requests from any origin.
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            cors: true,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_forbidden_fields() -> Vec<String> {
    ["password", "salary", "ssn", "credentials"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_page_size() -> u32 {
    crate::DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u32 {
    1000
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    8080
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NlqConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let paging = &self.pagination;
        if paging.default_page_size == 0 {
            return Err(ConfigError::Config(
                "pagination.default_page_size must be positive".to_string(),
            ));
        }
        if paging.default_page_size > paging.max_page_size {
            return Err(ConfigError::Config(format!(
                "pagination.default_page_size ({}) exceeds max_page_size ({})",
                paging.default_page_size, paging.max_page_size
            )));
        }
        Ok(())
    }
}
