//! /nuke command - Delete every message in the channel

use nuke_core::DeletionRequest;

use crate::commands::{channel_id, preflight, start_deletion, user_id, Context};
use crate::error::Result;

/// Delete all messages in this channel
#[poise::command(slash_command, guild_only, rename = "nuke")]
pub async fn nuke(
    ctx: Context<'_>,
    #[description = "Type 'yes' to confirm the action"] confirm: String,
) -> Result<()> {
    if !preflight(ctx, &confirm).await? {
        return Ok(());
    }

    let request = DeletionRequest::all(channel_id(ctx), user_id(ctx));
    start_deletion(ctx, request).await
}
