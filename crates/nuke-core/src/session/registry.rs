//! Per-channel session registry
//!
//! Check-and-insert in [`SessionRegistry::start`] and remove-and-cancel in
//! [`SessionRegistry::stop`] each run under the map shard's write lock for
//! that channel, so a start and a stop for the same channel never
//! interleave and two concurrent stops cannot both succeed.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::signal::CancellationSignal;
use crate::types::{ChannelId, UserId};
use crate::{Error, Result};

#[derive(Debug)]
struct ActiveSession {
    id: Uuid,
    token: CancellationToken,
    requested_by: UserId,
    started_at: DateTime<Utc>,
}

/// Handed to whoever started a session; identifies it for completion
#[derive(Debug, Clone)]
pub struct SessionTicket {
    channel_id: ChannelId,
    session_id: Uuid,
    signal: CancellationSignal,
}

impl SessionTicket {
    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Signal for the delete loop bound to this session
    pub fn signal(&self) -> CancellationSignal {
        self.signal.clone()
    }
}

/// Single source of truth for "is a deletion running in channel X"
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<ChannelId, ActiveSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session, rejecting the request if one is already live
    pub fn start(&self, channel_id: ChannelId, requested_by: UserId) -> Result<SessionTicket> {
        match self.sessions.entry(channel_id) {
            Entry::Occupied(existing) => {
                let existing = existing.get();
                debug!(
                    "Rejecting start in channel {}: session {} by {} running since {}",
                    channel_id, existing.id, existing.requested_by, existing.started_at
                );
                Err(Error::AlreadyRunning(channel_id))
            }
            Entry::Vacant(slot) => {
                let token = CancellationToken::new();
                let session = ActiveSession {
                    id: Uuid::new_v4(),
                    token: token.clone(),
                    requested_by,
                    started_at: Utc::now(),
                };
                let ticket = SessionTicket {
                    channel_id,
                    session_id: session.id,
                    signal: CancellationSignal::new(token),
                };
                slot.insert(session);
                info!(
                    "Started deletion session {} in channel {}",
                    ticket.session_id, channel_id
                );
                Ok(ticket)
            }
        }
    }

    /// Cancel and remove the live session, if any
    pub fn stop(&self, channel_id: ChannelId) -> bool {
        match self.sessions.remove(&channel_id) {
            Some((_, session)) => {
                session.token.cancel();
                info!(
                    "Stopped deletion session {} in channel {}",
                    session.id, channel_id
                );
                true
            }
            None => false,
        }
    }

    /// Remove the ticket's session after its loop ended on its own.
    ///
    /// Leaves a newer session for the same channel untouched.
    pub fn finish(&self, ticket: &SessionTicket) -> bool {
        self.sessions
            .remove_if(&ticket.channel_id, |_, session| {
                session.id == ticket.session_id
            })
            .is_some()
    }

    pub fn is_active(&self, channel_id: ChannelId) -> bool {
        self.sessions.contains_key(&channel_id)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Cancel every live session; returns how many there were
    pub fn stop_all(&self) -> usize {
        let mut stopped = 0;
        self.sessions.retain(|channel_id, session| {
            session.token.cancel();
            debug!("Cancelled session {} in channel {}", session.id, channel_id);
            stopped += 1;
            false
        });
        stopped
    }
}
