//! Rate-limited bulk deletion
//!
//! A [`DeletionWorker`] walks a channel's history page by page and deletes
//! every message inside a [`TimeWindow`], one message at a time.

mod pacing;
mod report;
mod request;
mod worker;

pub use pacing::Pacing;
pub use report::{DeletionOutcome, DeletionReport};
pub use request::{is_confirmed, year_choices, DeletionRequest, TimeWindow};
pub use worker::DeletionWorker;
