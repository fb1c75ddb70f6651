//! Configuration management
//!
//! Settings come from the process environment (after `.env` has been
//! loaded by the binary):
//!
//! - `DISCORD_TOKEN` (or `DISCORD_BOT_TOKEN`): bot credential, required
//! - `TEST_GUILD_ID` (or `GUILD_ID`): register commands in one guild only
//! - `CHECK_MODE`: `owner` for the guild-owner check, otherwise administrator

use std::time::Duration;

use crate::auth::AuthMode;
use crate::deletion::Pacing;
use crate::{Error, Result};

/// Tuning for the delete loop
#[derive(Debug, Clone)]
pub struct DeletionConfig {
    /// Messages requested per history page (platform maximum is 100)
    pub page_size: u8,
    /// Minimum pause after each successful delete
    pub pacing_base: Duration,
    /// Random extra pause added on top of `pacing_base`
    pub pacing_jitter: Duration,
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            pacing_base: Duration::from_millis(300),
            pacing_jitter: Duration::from_millis(200),
        }
    }
}

impl DeletionConfig {
    pub fn pacing(&self) -> Pacing {
        Pacing::new(self.pacing_base, self.pacing_jitter)
    }
}

/// Main configuration for nukeit
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,

    /// Guild to register commands in; `None` registers globally
    pub guild_id: Option<u64>,

    /// Who may run the deletion commands
    pub auth_mode: AuthMode,

    /// Discord REST API base URL
    pub api_base_url: String,

    pub deletion: DeletionConfig,
}

fn default_api_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

impl Config {
    /// Create a configuration with defaults for everything but the token
    pub fn new(discord_token: impl Into<String>) -> Self {
        Self {
            discord_token: discord_token.into(),
            guild_id: None,
            auth_mode: AuthMode::default(),
            api_base_url: default_api_base_url(),
            deletion: DeletionConfig::default(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = non_empty("DISCORD_TOKEN")
            .or_else(|| non_empty("DISCORD_BOT_TOKEN"))
            .ok_or_else(|| {
                Error::Config("DISCORD_TOKEN is missing in environment variables".to_string())
            })?;

        let mut config = Self::new(token.trim());

        if let Some(raw) = non_empty("TEST_GUILD_ID").or_else(|| non_empty("GUILD_ID")) {
            let id = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("Invalid guild id '{}': {}", raw, e)))?;
            config.guild_id = Some(id);
        }

        if let Some(mode) = lookup("CHECK_MODE") {
            // AuthMode parsing is infallible
            config.auth_mode = mode.parse().unwrap_or_default();
        }

        Ok(config)
    }
}
