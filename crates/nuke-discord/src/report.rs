//! Delivers deletion reports to the requesting user

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::CreateMessage;
use serenity::http::Http;
use tracing::{info, warn};

use nuke_core::{DeletionReport, PlatformError, ReportSink};

/// Sends the summary by DM, falling back to the channel itself
pub struct DirectMessageSink {
    http: Arc<Http>,
}

impl DirectMessageSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReportSink for DirectMessageSink {
    async fn deliver(&self, report: &DeletionReport) -> Result<(), PlatformError> {
        let text = report.summary();
        let user_id = serenity::model::id::UserId::new(report.requested_by.get());

        match user_id
            .direct_message(&self.http, CreateMessage::new().content(&text))
            .await
        {
            Ok(_) => {
                info!(
                    "Sent deletion report for channel {} to user {}",
                    report.channel_id, report.requested_by
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Failed to DM report to user {}: {}, posting in channel {}",
                    report.requested_by, e, report.channel_id
                );
                serenity::model::id::ChannelId::new(report.channel_id.get())
                    .say(&self.http, text)
                    .await
                    .map(|_| ())
                    .map_err(|e| PlatformError::Request(e.to_string()))
            }
        }
    }
}
