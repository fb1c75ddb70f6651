//! Preventive pacing between deletes

use std::time::Duration;

use rand::Rng;

/// Pause taken after every successful delete: `base` plus a uniformly
/// random share of `jitter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    base: Duration,
    jitter: Duration,
}

impl Pacing {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// No pause at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Next delay in `[base, base + jitter)`
    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        let extra = rand::rng().random_range(0..jitter_ms);
        self.base + Duration::from_millis(extra)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), Duration::from_millis(200))
    }
}
