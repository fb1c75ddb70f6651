//! nuke-core: channel message deletion engine
//!
//! Platform-independent pieces of the bot: the paginated, rate-limit-aware
//! delete loop, the per-channel session registry that keeps at most one
//! loop alive per channel, authorization policy and configuration.

pub mod auth;
pub mod config;
pub mod deletion;
pub mod error;
pub mod platform;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthDenial, AuthMode, AuthorizationPolicy, CallerFacts};
pub use config::{Config, DeletionConfig};
pub use deletion::{
    is_confirmed, year_choices, DeletionOutcome, DeletionReport, DeletionRequest,
    DeletionWorker, Pacing, TimeWindow,
};
pub use error::{Error, Result};
pub use platform::{MessageGateway, PlatformError, ReportSink};
pub use session::{CancellationSignal, DeletionService, SessionRegistry, SessionTicket};
pub use types::{ChannelId, MessageId, MessageSummary, UserId};
