//! Identifier and message types shared by every platform adapter

use std::fmt;

use chrono::{DateTime, Utc};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// A channel, the unit of scope for a deletion run
    ChannelId
);
snowflake!(
    /// A single message; ids grow with creation time
    MessageId
);
snowflake!(UserId);

/// The part of a platform message the delete loop cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: MessageId,
    pub timestamp: DateTime<Utc>,
}

impl MessageSummary {
    pub fn new(id: impl Into<MessageId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp,
        }
    }
}
