//! Sonia - terminal chat client for the Sonia document assistant
//!
#![doc = "Main entry point for the Sonia chat client."]

use anyhow::Result;

use sonia::cli::{Cli, Commands};
use sonia::commands;
use sonia::config::Config;
use sonia::logging::{bootstrap_subscriber, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration; warnings raised while loading go to stderr
    let config_path = cli.config.as_str();
    let config = tracing::subscriber::with_default(bootstrap_subscriber(cli.verbose), || {
        Config::load(config_path, &cli)
    })?;

    // Validate configuration
    config.validate()?;

    init_logging(&config.logging)?;
    tracing::debug!(config = %config_path, "Configuration loaded");

    match cli.command {
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Ask { query } => {
            tracing::debug!("Asking: {}", query);
            commands::ask::run_ask(config, query).await?;
            Ok(())
        }
        Commands::Upload { file } => {
            tracing::debug!("Uploading: {}", file.display());
            commands::upload::run_upload(config, file).await?;
            Ok(())
        }
        Commands::Health { json } => {
            commands::health::run_health(config, json).await?;
            Ok(())
        }
    }
}
