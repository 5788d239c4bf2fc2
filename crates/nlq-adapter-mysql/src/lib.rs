use async_trait::async_trait;
use nlq_core::{DatabaseConfig, Row, SchemaSnapshot};
use nlq_guard::PagedStatement;
use nlq_runtime::{RowStore, SchemaSource};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::time::Duration;

pub mod decode;
pub mod introspect;

pub use decode::row_to_json;

/// MySQL-backed schema source and row store.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Open a pool sized by `config.pool`.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = Self::pool_options(config)
            .connect(&config.connection_string())
            .await?;
        tracing::info!(
            host = %config.host,
            database = %config.database,
            max_connections = config.pool.max_connections,
            "MySQL pool ready"
        );
        Ok(Self { pool })
    }

    /// Pool that connects on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = Self::pool_options(config).connect_lazy(&config.connection_string())?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
        MySqlPoolOptions::new()
            .min_connections(config.pool.min_connections)
            .max_connections(config.pool.max_connections)
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_seconds))
    }
}

#[async_trait]
impl SchemaSource for MySqlStore {
    async fn fetch_schema(&self, table: Option<&str>) -> anyhow::Result<SchemaSnapshot> {
        introspect::load_schema(&self.pool, table).await
    }
}

#[async_trait]
impl RowStore for MySqlStore {
    async fn fetch_page(&self, statement: &PagedStatement) -> anyhow::Result<Vec<Row>> {
        let rows = sqlx::query(sqlx::AssertSqlSafe(statement.sql.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow::anyhow!(database_message(e)))?;
        Ok(rows.iter().map(row_to_json).collect())
    }
}

// Prefer the server's own message over sqlx's wrapper text.
fn database_message(err: sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => other.to_string(),
    }
}
