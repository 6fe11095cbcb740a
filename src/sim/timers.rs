//! Wall-clock deadlines
//!
//! Cooldowns (paddle re-arm, boost, spawn hover) are stored as expiry
//! instants and compared against the caller's clock each tick. They keep
//! running while the game is paused.

use std::time::{Duration, Instant};

/// An optional expiry instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    until: Option<Instant>,
}

impl Deadline {
    /// A deadline that is not running
    pub const fn idle() -> Self {
        Self { until: None }
    }

    /// Start (or restart) the deadline `duration` after `now`
    pub fn arm(&mut self, now: Instant, duration: Duration) {
        self.until = Some(now + duration);
    }

    /// Stop the deadline early
    pub fn clear(&mut self) {
        self.until = None;
    }

    /// True until the expiry instant is reached
    pub fn is_active(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Time left before expiry (zero when idle or expired)
    pub fn remaining(&self, now: Instant) -> Duration {
        self.until
            .map(|until| until.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }
}
