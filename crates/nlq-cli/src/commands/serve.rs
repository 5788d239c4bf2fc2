//! `nlq serve` - start the HTTP server.

use nlq_core::NlqConfig;
use nlq_server::NlqServer;

pub async fn run(config: NlqConfig) -> anyhow::Result<()> {
    tracing::info!(
        address = %config.server.bind_address(),
        audit_backend = ?config.audit.backend,
        "Starting nlq server"
    );
    NlqServer::from_config(config).await?.run().await?;
    Ok(())
}
