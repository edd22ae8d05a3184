//! Per-provider backoff entry.

use std::time::{Duration, Instant};

/// Failure bookkeeping for one provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackoffEntry {
    pub consecutive_failures: u32,
    /// Earliest instant the provider may be tried again; `None` when not in timeout.
    pub available_at: Option<Instant>,
}

impl BackoffEntry {
    /// Time left until the provider is eligible, zero if it already is.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.available_at
            .map(|at| at.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_available(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }
}
