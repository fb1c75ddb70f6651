//! The delete loop
//!
//! Pages through history newest to oldest, deleting matching messages one
//! at a time. Cancellation is cooperative and is checked before each page
//! fetch and before each delete attempt. Throttling responses are absorbed
//! by sleeping and retrying the same message; any other delete error skips
//! that message. A failed page fetch ends the run early. The loop never
//! returns an error: every run ends in a [`DeletionReport`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::DeletionConfig;
use crate::deletion::pacing::Pacing;
use crate::deletion::report::{DeletionOutcome, DeletionReport};
use crate::deletion::request::DeletionRequest;
use crate::platform::{MessageGateway, PlatformError};
use crate::session::CancellationSignal;
use crate::types::{ChannelId, MessageId};

/// Platform maximum for one history page
const MAX_PAGE_SIZE: u8 = 100;

/// Floor for throttling sleeps, so a zero retry hint cannot spin
const MIN_THROTTLE_SLEEP: Duration = Duration::from_millis(100);

enum Attempt {
    Deleted,
    Failed,
    Cancelled,
}

/// Runs deletion loops against a [`MessageGateway`]
#[derive(Clone)]
pub struct DeletionWorker {
    gateway: Arc<dyn MessageGateway>,
    pacing: Pacing,
    page_size: u8,
}

impl DeletionWorker {
    pub fn new(gateway: Arc<dyn MessageGateway>) -> Self {
        Self {
            gateway,
            pacing: Pacing::default(),
            page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn from_config(gateway: Arc<dyn MessageGateway>, config: &DeletionConfig) -> Self {
        Self::new(gateway)
            .with_pacing(config.pacing())
            .with_page_size(config.page_size)
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Clamped to 1..=100
    pub fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn page_size(&self) -> u8 {
        self.page_size
    }

    /// Delete every qualifying message in the request's channel
    pub async fn run(&self, request: &DeletionRequest, signal: &CancellationSignal) -> DeletionReport {
        let channel_id = request.channel_id;
        let mut report = DeletionReport::begin(request);
        let mut cursor: Option<MessageId> = None;

        info!("Starting deletion in channel {} ({})", channel_id, request.window);

        let outcome = 'pages: loop {
            if signal.is_cancelled() {
                break DeletionOutcome::Cancelled;
            }

            let page = match self
                .gateway
                .messages_before(channel_id, cursor, self.page_size)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!("Failed to fetch messages in channel {}: {}", channel_id, e);
                    break DeletionOutcome::FetchFailed(e.to_string());
                }
            };
            report.pages += 1;

            debug!(
                "Fetched page {} with {} messages in channel {} (before {:?})",
                report.pages,
                page.len(),
                channel_id,
                cursor
            );

            if page.is_empty() {
                break DeletionOutcome::Completed;
            }

            for message in &page {
                if signal.is_cancelled() {
                    break 'pages DeletionOutcome::Cancelled;
                }

                if !request.window.contains(message.timestamp) {
                    report.skipped += 1;
                    continue;
                }

                match self.delete_one(channel_id, message.id, signal, &mut report).await {
                    Attempt::Deleted => {
                        report.deleted += 1;
                        tokio::time::sleep(self.pacing.next_delay()).await;
                    }
                    Attempt::Failed => report.failed += 1,
                    Attempt::Cancelled => break 'pages DeletionOutcome::Cancelled,
                }
            }

            // Filtering never holds the cursor back
            cursor = page.iter().map(|m| m.id).min();

            if page.len() < usize::from(self.page_size) {
                break DeletionOutcome::Completed;
            }
        };

        if outcome == DeletionOutcome::Cancelled {
            info!("Stopped deletion in channel {}", channel_id);
        }

        let report = report.finish(outcome);
        info!(
            "Deleted {} messages in channel {} (skipped {}, failed {}, throttled {})",
            report.deleted, channel_id, report.skipped, report.failed, report.throttled
        );
        report
    }

    async fn delete_one(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        signal: &CancellationSignal,
        report: &mut DeletionReport,
    ) -> Attempt {
        loop {
            match self.gateway.delete_message(channel_id, message_id).await {
                Ok(()) => return Attempt::Deleted,
                Err(PlatformError::RateLimited { retry_after, global }) => {
                    report.throttled += 1;
                    let wait = retry_after.max(MIN_THROTTLE_SLEEP);
                    warn!(
                        "Rate limit hit in channel {} (global: {}), sleeping for {:.2} seconds",
                        channel_id,
                        global,
                        wait.as_secs_f64()
                    );

                    tokio::select! {
                        _ = signal.cancelled() => return Attempt::Cancelled,
                        _ = tokio::time::sleep(wait) => {}
                    }

                    if signal.is_cancelled() {
                        return Attempt::Cancelled;
                    }
                }
                Err(e) => {
                    warn!(
                        "Error deleting message {} in channel {}: {}",
                        message_id, channel_id, e
                    );
                    return Attempt::Failed;
                }
            }
        }
    }
}
