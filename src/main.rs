//! Ragdesk CLI entry point.

use anyhow::Result;
use clap::Parser;
use ragdesk::cli::{commands, Cli, Commands};
use ragdesk::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config_path();
    let mut settings = Settings::load_from(Some(&config_path))?;
    if let Some(server) = &cli.server {
        settings.server.base_url = server.clone();
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_directive(&settings.general)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match &cli.command {
        Commands::Ask { question, stream } => {
            commands::run_ask(question, *stream, settings).await?;
        }

        Commands::Ingest { files } => {
            commands::run_ingest(files, settings).await?;
        }

        Commands::Chat => {
            commands::run_chat(settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
