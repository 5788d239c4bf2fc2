use nlq_core::NlqConfig;
use nlq_server::NlqServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var("NLQ_CONFIG").unwrap_or_else(|_| "nlq.yaml".to_string());
    let config = NlqConfig::load_or_default(&config_path)?;

    NlqServer::from_config(config).await?.run().await?;
    Ok(())
}
