use clap::{Parser, Subcommand};
use nlq_core::NlqConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "nlq", version, about = "Natural-language queries over MySQL")]
struct Cli {
    /// Configuration file (YAML). Missing file means defaults.
    #[arg(long, global = true, env = "NLQ_CONFIG", default_value = "nlq.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve {
        /// Override `server.listen_port`.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Interactive client for a running server.
    Ask {
        /// Base URL of the server.
        #[arg(long, default_value = "http://localhost:8080")]
        server: String,

        /// Rows per page.
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },

    /// Run the security gate on a question and its SQL without a database.
    Check {
        #[arg(long)]
        question: String,

        #[arg(long)]
        sql: String,

        /// Print the verdict as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve { port } => {
            let mut config = load_config(&cli.config)?;
            if let Some(port) = port {
                config.server.listen_port = port;
            }
            commands::serve::run(config).await?
        }
        Command::Ask { server, page_size } => commands::ask::run(&server, page_size).await?,
        Command::Check {
            question,
            sql,
            json,
        } => {
            let config = load_config(&cli.config)?;
            if !commands::check::run(&config, &question, &sql, json)? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<NlqConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
    }
    Ok(NlqConfig::load_or_default(path)?)
}
