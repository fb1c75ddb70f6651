//! nukeit: channel cleanup bot
//!
//! Reads `DISCORD_TOKEN`, `TEST_GUILD_ID` and `CHECK_MODE` from the
//! environment (or `./.env`) and serves the `/nuke`, `/nuke-to-date` and
//! `/stop` slash commands until Ctrl+C or SIGTERM.

use nuke_core::Config;
use nuke_discord::NukeBot;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse()?)
        )
        .init();

    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // Load configuration from environment
    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting nukeit...");
    tracing::info!("Authorization mode: {}", config.auth_mode);
    match config.guild_id {
        Some(id) => tracing::info!("Commands will be registered in guild {}", id),
        None => tracing::info!("Commands will be registered globally"),
    }

    let bot = NukeBot::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to create bot: {}", e))?;

    tracing::info!("Press Ctrl+C to exit");
    bot.run(shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
