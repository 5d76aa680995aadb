//! Toolboxx Assist - legal assistant chat client
//!
#![doc = "Toolboxx Assist - legal assistant chat client"]
#![doc = "Main entry point for the Toolboxx Assist application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use toolboxx_assist::cli::{Cli, Commands};
use toolboxx_assist::commands;
use toolboxx_assist::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a session database path on the CLI, mirror it
    // into TOOLBOXX_STATE_DB so the storage initializer can pick it up.
    // This keeps callers unchanged while allowing `KvStore::open()` to
    // honor an override.
    if let Some(db_path) = &cli.state_db {
        std::env::set_var("TOOLBOXX_STATE_DB", db_path);
        tracing::info!("Using session DB override from CLI: {}", db_path);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat => {
            tracing::info!("Starting interactive chat session");
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::run_history(config, command).await?;
            Ok(())
        }
        Commands::Login { email } => {
            tracing::info!("Starting login");
            commands::auth::run_login(config, email).await?;
            Ok(())
        }
        Commands::Register { email } => {
            tracing::info!("Starting registration");
            commands::auth::run_register(config, email).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::auth::run_logout()?;
            Ok(())
        }
        Commands::Submissions => {
            tracing::info!("Fetching submissions");
            commands::submissions::run_submissions(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("toolboxx_assist=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
