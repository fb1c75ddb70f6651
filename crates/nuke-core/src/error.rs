//! Error types for nuke-core

use thiserror::Error;

use crate::types::ChannelId;

/// Main error type for nuke-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("A deletion is already running in channel {0}")]
    AlreadyRunning(ChannelId),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for nuke-core
pub type Result<T> = std::result::Result<T, Error>;
