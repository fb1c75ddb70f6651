//! In-memory platform fakes for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio_util::sync::CancellationToken;

use crate::deletion::DeletionReport;
use crate::platform::{MessageGateway, PlatformError, ReportSink};
use crate::types::{ChannelId, MessageId, MessageSummary};

#[derive(Default)]
struct State {
    /// Newest first
    messages: Vec<MessageSummary>,
    fetches: Vec<(Option<MessageId>, u8)>,
    fail_fetch_at: Option<usize>,
    throttles: HashMap<MessageId, Vec<Duration>>,
    failing: HashSet<MessageId>,
    attempts: HashMap<MessageId, usize>,
    deleted: usize,
    cancel_after: Option<(usize, CancellationToken)>,
}

/// A single channel whose history lives in memory
#[derive(Default)]
pub(crate) struct FakeChannel {
    state: Mutex<State>,
    /// Message id whose next delete panics, 0 for none
    panic_on: AtomicU64,
}

impl FakeChannel {
    /// Messages with ids `1..=count`, one second apart
    pub fn with_messages(count: u64) -> Self {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let messages = (1..=count)
            .rev()
            .map(|id| MessageSummary::new(id, base + chrono::Duration::seconds(id as i64)))
            .collect();
        Self::from_messages(messages)
    }

    /// One message per timestamp, given newest first
    pub fn with_timestamps(stamps: &[DateTime<Utc>]) -> Self {
        let count = stamps.len() as u64;
        let messages = stamps
            .iter()
            .enumerate()
            .map(|(i, t)| MessageSummary::new(count - i as u64, *t))
            .collect();
        Self::from_messages(messages)
    }

    fn from_messages(messages: Vec<MessageSummary>) -> Self {
        Self {
            state: Mutex::new(State {
                messages,
                ..State::default()
            }),
            panic_on: AtomicU64::new(0),
        }
    }

    /// Answer the next delete of `id` with a throttling signal; stacks
    pub fn throttle(&self, id: MessageId, retry_after: Duration) {
        self.state
            .lock()
            .unwrap()
            .throttles
            .entry(id)
            .or_default()
            .push(retry_after);
    }

    /// The next delete of `id` panics, as a buggy adapter would
    pub fn panic_on_delete(&self, id: MessageId) {
        self.panic_on.store(id.get(), Ordering::SeqCst);
    }

    /// Every delete of `id` fails
    pub fn fail_delete(&self, id: MessageId) {
        self.state.lock().unwrap().failing.insert(id);
    }

    /// The `nth` fetch (1-based) fails
    pub fn fail_fetch_at(&self, nth: usize) {
        self.state.lock().unwrap().fail_fetch_at = Some(nth);
    }

    /// Cancel `token` right after the `count`th successful delete
    pub fn cancel_after_deletes(&self, count: usize, token: CancellationToken) {
        self.state.lock().unwrap().cancel_after = Some((count, token));
    }

    pub fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches.len()
    }

    pub fn fetch_limits(&self) -> Vec<u8> {
        self.state.lock().unwrap().fetches.iter().map(|f| f.1).collect()
    }

    pub fn fetch_cursors(&self) -> Vec<Option<MessageId>> {
        self.state.lock().unwrap().fetches.iter().map(|f| f.0).collect()
    }

    pub fn delete_attempts(&self, id: MessageId) -> usize {
        self.state.lock().unwrap().attempts.get(&id).copied().unwrap_or(0)
    }

    pub fn remaining(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub fn remaining_timestamps(&self) -> Vec<DateTime<Utc>> {
        self.state.lock().unwrap().messages.iter().map(|m| m.timestamp).collect()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.state.lock().unwrap().messages.iter().any(|m| m.id == id)
    }
}

#[async_trait]
impl MessageGateway for FakeChannel {
    async fn messages_before(
        &self,
        _channel_id: ChannelId,
        before: Option<MessageId>,
        limit: u8,
    ) -> Result<Vec<MessageSummary>, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.fetches.push((before, limit));

        if state.fail_fetch_at == Some(state.fetches.len()) {
            return Err(PlatformError::Request("HTTP 500".into()));
        }

        Ok(state
            .messages
            .iter()
            .filter(|m| before.is_none_or(|cursor| m.id < cursor))
            .take(usize::from(limit))
            .cloned()
            .collect())
    }

    async fn delete_message(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), PlatformError> {
        if self
            .panic_on
            .compare_exchange(message_id.get(), 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            panic!("delete of message {} blew up", message_id);
        }

        let mut state = self.state.lock().unwrap();
        *state.attempts.entry(message_id).or_insert(0) += 1;

        if let Some(retry_after) = state.throttles.get_mut(&message_id).and_then(Vec::pop) {
            return Err(PlatformError::RateLimited {
                retry_after,
                global: false,
            });
        }
        if state.failing.contains(&message_id) {
            return Err(PlatformError::Forbidden("Missing Permissions".into()));
        }

        let before = state.messages.len();
        state.messages.retain(|m| m.id != message_id);
        if state.messages.len() == before {
            return Err(PlatformError::NotFound("Unknown Message".into()));
        }

        state.deleted += 1;
        if let Some((count, token)) = &state.cancel_after {
            if *count == state.deleted {
                token.cancel();
            }
        }
        Ok(())
    }
}

/// Collects delivered reports
#[derive(Default)]
pub(crate) struct RecordingSink {
    reports: Mutex<Vec<DeletionReport>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn reports(&self) -> Vec<DeletionReport> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportSink for RecordingSink {
    async fn deliver(&self, report: &DeletionReport) -> Result<(), PlatformError> {
        self.reports.lock().unwrap().push(report.clone());
        if self.fail {
            return Err(PlatformError::Forbidden("Cannot send messages to this user".into()));
        }
        Ok(())
    }
}
