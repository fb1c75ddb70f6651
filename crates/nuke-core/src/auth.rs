//! Authorization policy for destructive commands
//!
//! The platform adapter gathers [`CallerFacts`] about the invoking user and
//! a pluggable [`AuthorizationPolicy`] decides. [`AuthMode`] covers the two
//! policies the bot ships with.

use std::fmt;
use std::str::FromStr;

/// What the adapter could find out about the caller.
///
/// `None` means the lookup failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallerFacts {
    pub administrator: Option<bool>,
    pub guild_owner: Option<bool>,
}

/// Why a caller was turned away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDenial {
    NotAdministrator,
    NotGuildOwner,
    PermissionLookupFailed,
    GuildLookupFailed,
}

impl AuthDenial {
    /// Text shown to the caller
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotAdministrator => "Administrator permission required.",
            Self::NotGuildOwner => "You must be the guild owner to execute this command.",
            Self::PermissionLookupFailed => "Failed to fetch permissions.",
            Self::GuildLookupFailed => "Failed to fetch guild info.",
        }
    }
}

impl fmt::Display for AuthDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Decides whether a caller may start or stop a deletion
pub trait AuthorizationPolicy: Send + Sync {
    fn authorize(&self, facts: &CallerFacts) -> Result<(), AuthDenial>;

    /// Whether [`CallerFacts::administrator`] must be looked up
    fn needs_administrator(&self) -> bool {
        true
    }

    /// Whether [`CallerFacts::guild_owner`] must be looked up
    fn needs_guild_owner(&self) -> bool {
        true
    }
}

/// Built-in authorization modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Caller needs the Administrator permission in the channel
    #[default]
    Administrator,
    /// Caller must own the guild
    GuildOwner,
}

impl AuthorizationPolicy for AuthMode {
    fn authorize(&self, facts: &CallerFacts) -> Result<(), AuthDenial> {
        match self {
            Self::Administrator => match facts.administrator {
                Some(true) => Ok(()),
                Some(false) => Err(AuthDenial::NotAdministrator),
                None => Err(AuthDenial::PermissionLookupFailed),
            },
            Self::GuildOwner => match facts.guild_owner {
                Some(true) => Ok(()),
                Some(false) => Err(AuthDenial::NotGuildOwner),
                None => Err(AuthDenial::GuildLookupFailed),
            },
        }
    }

    fn needs_administrator(&self) -> bool {
        *self == Self::Administrator
    }

    fn needs_guild_owner(&self) -> bool {
        *self == Self::GuildOwner
    }
}

impl FromStr for AuthMode {
    type Err = std::convert::Infallible;

    /// `owner` selects the guild-owner check, anything else the administrator check
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("owner") {
            Ok(Self::GuildOwner)
        } else {
            Ok(Self::Administrator)
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Administrator => f.write_str("administrator"),
            Self::GuildOwner => f.write_str("owner"),
        }
    }
}
