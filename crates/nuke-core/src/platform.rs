//! Platform Gateway seams
//!
//! The delete loop only needs two things from a chat platform: a paginated
//! view of a channel's history and a way to delete one message. The final
//! report leaves through a [`ReportSink`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::deletion::DeletionReport;
use crate::types::{ChannelId, MessageId, MessageSummary};

/// Errors surfaced by a platform adapter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    /// The platform asked us to back off before retrying
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration, global: bool },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing permissions: {0}")]
    Forbidden(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl PlatformError {
    /// Retry delay if this is a throttling signal
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Message history access for one channel at a time
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// List up to `limit` messages older than `before`, newest first.
    ///
    /// `before = None` starts from the most recent message.
    async fn messages_before(
        &self,
        channel_id: ChannelId,
        before: Option<MessageId>,
        limit: u8,
    ) -> Result<Vec<MessageSummary>, PlatformError>;

    /// Delete a single message.
    ///
    /// Throttling must be reported as [`PlatformError::RateLimited`].
    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), PlatformError>;
}

/// Receives the report of a finished deletion run
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &DeletionReport) -> Result<(), PlatformError>;
}
