//! Slash commands for the bot (poise implementation)

mod nuke;
mod nuke_to_date;
mod stop;

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use nuke_core::{
    is_confirmed, AuthorizationPolicy, CallerFacts, ChannelId, DeletionRequest, DeletionService,
    UserId,
};

use crate::error::Result;

/// User data stored and accessible in all command invocations
pub struct Data {
    pub service: DeletionService,
    pub policy: Arc<dyn AuthorizationPolicy>,
}

/// Error type for commands
pub type Error = crate::error::DiscordError;

pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Export commands for registration
pub use nuke::nuke;
pub use nuke_to_date::{nuke_to_date, Month};
pub use stop::stop;

/// Get all commands for registration
pub fn get_commands() -> Vec<poise::Command<Data, Error>> {
    let mut dated = nuke_to_date();
    nuke_to_date::attach_year_choices(&mut dated, Utc::now());

    vec![nuke(), dated, stop()]
}

fn channel_id(ctx: Context<'_>) -> ChannelId {
    ChannelId::new(ctx.channel_id().get())
}

fn user_id(ctx: Context<'_>) -> UserId {
    UserId::new(ctx.author().id.get())
}

/// Reply visible only to the invoker
async fn reply_ephemeral(ctx: Context<'_>, text: impl Into<String>) -> Result<()> {
    ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

/// Only the lookups the active policy reads; each one may cost a REST call
async fn caller_facts(ctx: Context<'_>) -> CallerFacts {
    let policy = &ctx.data().policy;

    let administrator = if policy.needs_administrator() {
        ctx.author_member()
            .await
            .and_then(|member| member.permissions)
            .map(|permissions| permissions.administrator())
    } else {
        None
    };

    let guild_owner = if policy.needs_guild_owner() {
        ctx.partial_guild()
            .await
            .map(|guild| guild.owner_id == ctx.author().id)
    } else {
        None
    };

    CallerFacts {
        administrator,
        guild_owner,
    }
}

/// Run the authorization policy; replies with the reason on denial
async fn authorize(ctx: Context<'_>) -> Result<bool> {
    let facts = caller_facts(ctx).await;

    match ctx.data().policy.authorize(&facts) {
        Ok(()) => Ok(true),
        Err(denial) => {
            info!(
                "Denied /{} for user {} in channel {}: {}",
                ctx.command().name,
                ctx.author().id,
                ctx.channel_id(),
                denial
            );
            reply_ephemeral(ctx, denial.reason()).await?;
            Ok(false)
        }
    }
}

/// Permissions the platform resolved for the bot in this channel
fn bot_can_manage_messages(ctx: Context<'_>) -> bool {
    match ctx {
        poise::Context::Application(app) => app
            .interaction
            .app_permissions
            .is_some_and(|permissions| permissions.manage_messages()),
        poise::Context::Prefix(_) => false,
    }
}

/// Authorization, bot permission and confirmation checks for deletions
async fn preflight(ctx: Context<'_>, confirm: &str) -> Result<bool> {
    if !authorize(ctx).await? {
        return Ok(false);
    }

    if !bot_can_manage_messages(ctx) {
        reply_ephemeral(ctx, "I lack permissions to manage messages in this channel.").await?;
        return Ok(false);
    }

    if !is_confirmed(confirm) {
        reply_ephemeral(ctx, "You must type 'yes' to confirm the action.").await?;
        return Ok(false);
    }

    Ok(true)
}

/// Hand the request to the service and acknowledge
async fn start_deletion(ctx: Context<'_>, request: DeletionRequest) -> Result<()> {
    let announcement = if request.window.is_unbounded() {
        "Starting deletion...".to_string()
    } else {
        format!("Starting deletion {}...", request.window)
    };
    let channel = request.channel_id;

    match ctx.data().service.start(request) {
        Ok(_) => {
            info!(
                "User {} started deletion in channel {}",
                ctx.author().id,
                channel
            );
            ctx.say(announcement).await?;
        }
        Err(nuke_core::Error::AlreadyRunning(_)) => {
            reply_ephemeral(
                ctx,
                "A deletion is already running in this channel. Use /stop to cancel it.",
            )
            .await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
