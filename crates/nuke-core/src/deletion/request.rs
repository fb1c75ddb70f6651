//! Deletion request and time window

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::types::{ChannelId, UserId};
use crate::{Error, Result};

const DISPLAY_FORMAT: &str = "%d %b %Y %H:%M UTC";

/// How many years back `/nuke-to-date` offers
const YEAR_CHOICES_BACK: i32 = 5;

/// Inclusive time bounds; `None` leaves that side open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Every message qualifies
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// From the first instant of `month`/`year` (UTC) through `now`
    pub fn since_month(year: i32, month: u32, now: DateTime<Utc>) -> Result<Self> {
        let start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| Error::InvalidDate(format!("{}-{:02} is not a valid month", year, month)))?;

        if start > now {
            return Err(Error::InvalidDate(format!(
                "{} is in the future",
                start.format("%B %Y")
            )));
        }

        Ok(Self::new(Some(start), Some(now)))
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// `start <= t <= end`, open sides always pass
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| t >= start) && self.end.is_none_or(|end| t <= end)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (None, None) => f.write_str("all messages"),
            (start, end) => {
                let start = start.map_or_else(
                    || "the beginning".to_string(),
                    |t| t.format(DISPLAY_FORMAT).to_string(),
                );
                let end = end.map_or_else(
                    || "now".to_string(),
                    |t| t.format(DISPLAY_FORMAT).to_string(),
                );
                write!(f, "from {} to {}", start, end)
            }
        }
    }
}

/// A request to clear one channel. Immutable once the loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub channel_id: ChannelId,
    pub requested_by: UserId,
    pub window: TimeWindow,
}

impl DeletionRequest {
    /// Delete everything in the channel
    pub fn all(channel_id: ChannelId, requested_by: UserId) -> Self {
        Self::within(channel_id, requested_by, TimeWindow::unbounded())
    }

    pub fn within(channel_id: ChannelId, requested_by: UserId, window: TimeWindow) -> Self {
        Self {
            channel_id,
            requested_by,
            window,
        }
    }
}

/// The literal confirmation destructive commands require
pub fn is_confirmed(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}

/// Years accepted by `/nuke-to-date`: the last five plus the current one
pub fn year_choices(now: DateTime<Utc>) -> RangeInclusive<i32> {
    let year = now.year();
    (year - YEAR_CHOICES_BACK)..=year
}
