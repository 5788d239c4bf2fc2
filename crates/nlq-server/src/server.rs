//! Server assembly and lifecycle.

use crate::error::ServerError;
use crate::routes;
use crate::state::AppState;
use nlq_adapter_mysql::MySqlStore;
use nlq_audit::QueryLogger;
use nlq_core::NlqConfig;
use nlq_llm::LlmSqlGenerator;
use nlq_runtime::QueryOrchestrator;
use std::sync::Arc;
use tokio::net::TcpListener;

/// The nlq HTTP server.
pub struct NlqServer {
    config: NlqConfig,
    state: AppState,
    store: MySqlStore,
}

impl NlqServer {
    /// Wire the MySQL store, the LLM generator and the query log from
    /// configuration.
    pub async fn from_config(config: NlqConfig) -> Result<Self, ServerError> {
        let store = MySqlStore::connect(&config.database)
            .await
            .map_err(|e| ServerError::StartupFailed(format!("database connection failed: {}", e)))?;
        let generator = LlmSqlGenerator::from_config(&config.llm)
            .map_err(|e| ServerError::StartupFailed(e.to_string()))?;
        let logger = QueryLogger::new(&config.audit)
            .map_err(|e| ServerError::StartupFailed(e.to_string()))?;

        tracing::info!(
            model = generator.model(),
            strategy = ?config.pagination.strategy,
            forbidden_fields = ?config.security.forbidden_fields,
            "Pipeline configured"
        );

        let orchestrator = QueryOrchestrator::from_config(
            &config,
            Arc::new(store.clone()),
            Arc::new(generator),
            Arc::new(store.clone()),
            logger,
        );

        Ok(Self {
            state: AppState::new(orchestrator),
            config,
            store,
        })
    }

    /// Serve until Ctrl-C, then close the pool.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.server.bind_address();
        let app = routes::create_router(self.state, self.config.server.cors);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::StartupFailed(format!("Failed to bind to {}: {}", addr, e)))?;

        tracing::info!(address = %addr, "nlq server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::StartupFailed(e.to_string()))?;

        tracing::info!("Closing database pool");
        self.store.close().await;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
