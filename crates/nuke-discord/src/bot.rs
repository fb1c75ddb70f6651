//! Discord Bot implementation using poise on top of Serenity

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use nuke_core::{Config, DeletionService, DeletionWorker};

use crate::commands::{self, Data, Error};
use crate::error::DiscordError;
use crate::report::DirectMessageSink;
use crate::rest::DiscordRestClient;

/// How long running deletions get to deliver their reports on shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Discord Bot for nukeit
pub struct NukeBot {
    config: Config,
    service: DeletionService,
}

impl NukeBot {
    /// Create a new bot instance
    pub fn new(config: Config) -> crate::Result<Self> {
        if config.discord_token.trim().is_empty() {
            return Err(DiscordError::TokenNotSet);
        }

        let gateway = Arc::new(DiscordRestClient::with_base_url(
            &config.discord_token,
            config.api_base_url.as_str(),
        )?);
        let worker = DeletionWorker::from_config(gateway, &config.deletion);

        let http = Arc::new(serenity::Http::new(&config.discord_token));
        let sink = Arc::new(DirectMessageSink::new(http));

        Ok(Self {
            service: DeletionService::new(worker, sink),
            config,
        })
    }

    /// Connect and serve commands until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Slash commands only need guild metadata
        let intents = serenity::GatewayIntents::GUILDS;

        let data = Data {
            service: self.service.clone(),
            policy: Arc::new(self.config.auth_mode),
        };
        let guild_id = self.config.guild_id;

        info!("Starting Discord bot...");

        let framework = poise::Framework::builder()
            .options(poise::FrameworkOptions {
                commands: commands::get_commands(),
                on_error: |error| Box::pin(on_error(error)),
                ..Default::default()
            })
            .setup(move |ctx, ready, framework| {
                Box::pin(async move {
                    info!("Logged in as {}", ready.user.name);
                    register_commands(ctx, &framework.options().commands, guild_id).await?;
                    Ok(data)
                })
            })
            .build();

        let mut client = serenity::ClientBuilder::new(&self.config.discord_token, intents)
            .framework(framework)
            .await?;

        let shard_manager = client.shard_manager.clone();
        let service = self.service.clone();
        tokio::spawn(async move {
            shutdown.await;
            info!("Shutting down...");
            service.shutdown(SHUTDOWN_GRACE).await;
            shard_manager.shutdown_all().await;
        });

        // Runs until every shard has been shut down
        client.start().await?;

        Ok(())
    }
}

async fn register_commands(
    ctx: &serenity::Context,
    commands: &[poise::Command<Data, Error>],
    guild_id: Option<u64>,
) -> std::result::Result<(), Error> {
    match guild_id {
        Some(id) => {
            poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(id)).await?;
            info!("Registered {} commands in guild {}", commands.len(), id);
        }
        None => {
            poise::builtins::register_globally(ctx, commands).await?;
            info!("Registered {} commands globally", commands.len());
        }
    }
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to set up bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command /{}: {:?}", ctx.command().name, error);
            let reply = poise::CreateReply::default()
                .content("Something went wrong while running this command.")
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                warn!("Failed to send error reply: {:?}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
