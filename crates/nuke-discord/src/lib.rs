//! nuke-discord: Discord adapter for nukeit
//!
//! Slash commands via poise, message history and deletion over the Discord
//! REST API, and report delivery by direct message.

pub mod bot;
pub mod commands;
pub mod error;
pub mod report;
pub mod rest;

pub use bot::NukeBot;
pub use error::{DiscordError, Result};
pub use report::DirectMessageSink;
pub use rest::DiscordRestClient;
