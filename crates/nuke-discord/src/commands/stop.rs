//! /stop command - Cancel the running deletion in this channel

use crate::commands::{authorize, channel_id, reply_ephemeral, Context};
use crate::error::Result;

/// Stop an ongoing deletion process
#[poise::command(slash_command, guild_only, rename = "stop")]
pub async fn stop(ctx: Context<'_>) -> Result<()> {
    if !authorize(ctx).await? {
        return Ok(());
    }

    if ctx.data().service.stop(channel_id(ctx)) {
        ctx.say("Deletion process stopped.").await?;
    } else {
        reply_ephemeral(ctx, "No active deletion process in this channel.").await?;
    }

    Ok(())
}
