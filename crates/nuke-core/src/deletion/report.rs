//! Final report of a deletion run

use chrono::{DateTime, Utc};

use crate::deletion::request::{DeletionRequest, TimeWindow};
use crate::types::{ChannelId, UserId};

/// Why the loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// History exhausted
    Completed,
    /// A stop request was observed at a checkpoint
    Cancelled,
    /// A page fetch failed; counts cover what was done before it
    FetchFailed(String),
    /// The loop task died before producing counts
    Aborted(String),
}

/// Produced once when a loop ends and never mutated afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub channel_id: ChannelId,
    pub requested_by: UserId,
    pub window: TimeWindow,
    /// Messages actually deleted
    pub deleted: u64,
    /// Messages outside the window
    pub skipped: u64,
    /// Messages whose delete failed for a reason other than throttling
    pub failed: u64,
    /// Throttling responses absorbed by sleeping and retrying
    pub throttled: u64,
    /// History pages fetched
    pub pages: u64,
    pub outcome: DeletionOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeletionReport {
    pub(crate) fn begin(request: &DeletionRequest) -> Self {
        let now = Utc::now();
        Self {
            channel_id: request.channel_id,
            requested_by: request.requested_by,
            window: request.window,
            deleted: 0,
            skipped: 0,
            failed: 0,
            throttled: 0,
            pages: 0,
            outcome: DeletionOutcome::Completed,
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn finish(mut self, outcome: DeletionOutcome) -> Self {
        self.outcome = outcome;
        self.finished_at = Utc::now();
        self
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == DeletionOutcome::Completed
    }

    /// Report for a loop that died without returning one
    pub(crate) fn aborted(request: &DeletionRequest, reason: impl Into<String>) -> Self {
        Self::begin(request).finish(DeletionOutcome::Aborted(reason.into()))
    }

    /// Human-readable summary sent to the requester
    pub fn summary(&self) -> String {
        if let DeletionOutcome::Aborted(reason) = &self.outcome {
            return format!(
                "Deletion in <#{}> stopped unexpectedly: {}",
                self.channel_id, reason
            );
        }

        let mut text = format!(
            "Deleted {} message{} in <#{}> ({}).",
            self.deleted,
            if self.deleted == 1 { "" } else { "s" },
            self.channel_id,
            self.window
        );

        if self.failed > 0 {
            text.push_str(&format!(" {} could not be deleted.", self.failed));
        }

        match &self.outcome {
            DeletionOutcome::Completed => {}
            DeletionOutcome::Cancelled => text.push_str(" Stopped on request."),
            DeletionOutcome::FetchFailed(reason) => {
                text.push_str(&format!(" Stopped early, could not read history: {}", reason));
            }
            DeletionOutcome::Aborted(_) => {}
        }

        text
    }
}
