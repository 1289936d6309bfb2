//! Medquiry - terminal chat client for a medical inquiry assistant
//!
//! Main entry point for the Medquiry CLI.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use medquiry::cli::{Cli, Commands};
use medquiry::commands;
use medquiry::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Mirror a CLI store path into the env override so the store
    // initializer can pick it up without threading it everywhere.
    if let Some(store_dir) = &cli.store_dir {
        std::env::set_var("MEDQUIRY_STORE_DIR", store_dir);
        tracing::info!("Using store directory override from CLI: {}", store_dir);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { resume } => {
            tracing::info!("Starting interactive inquiry chat");
            if let Some(id) = &resume {
                tracing::debug!("Resuming session: {}", id);
            }
            commands::chat::run_chat(config, resume).await?;
            Ok(())
        }
        Commands::Sessions { command } => {
            tracing::info!("Starting session management command");
            commands::sessions::handle_sessions(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("medquiry=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
