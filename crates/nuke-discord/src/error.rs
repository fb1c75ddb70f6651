//! Error types for nuke-discord

use thiserror::Error;

/// nuke-discord error type
#[derive(Error, Debug)]
pub enum DiscordError {
    #[error("Discord token not set")]
    TokenNotSet,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Core error: {0}")]
    Core(#[from] nuke_core::Error),

    #[error("Serenity error: {0}")]
    SerenityError(#[from] serenity::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DiscordError>;
