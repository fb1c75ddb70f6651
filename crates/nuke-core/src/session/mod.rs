//! Deletion session management
//!
//! Tracks at most one running deletion per channel and owns the
//! cancellation signal each running loop observes.

mod registry;
mod service;
mod signal;

pub use registry::{SessionRegistry, SessionTicket};
pub use service::DeletionService;
pub use signal::CancellationSignal;
