//! Backoff state for every provider, keyed by name.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::{BackoffEntry, BackoffPolicy};

/// In-memory backoff table.
///
/// Entries are created lazily on first feedback; a provider with no entry
/// has never failed and is always available.
#[derive(Debug, Clone, Default)]
pub struct BackoffTable {
    entries: HashMap<String, BackoffEntry>,
    policy: BackoffPolicy,
}

impl BackoffTable {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Look up the entry for a provider, if it has ever received feedback.
    pub fn get(&self, provider: &str) -> Option<&BackoffEntry> {
        self.entries.get(provider)
    }

    /// Record a failed attempt. Returns the timeout now in effect.
    pub fn record_failure(&mut self, provider: &str, now: Instant) -> Duration {
        let entry = self.entries.entry(provider.to_string()).or_default();
        entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
        let delay = self.policy.delay_for(entry.consecutive_failures);
        entry.available_at = Some(now + delay);
        delay
    }

    /// Record a successful attempt, clearing any timeout.
    pub fn record_success(&mut self, provider: &str) {
        if let Some(entry) = self.entries.get_mut(provider) {
            entry.consecutive_failures = 0;
            entry.available_at = None;
        }
    }

    /// Time until `provider` may be tried again (zero if available now).
    pub fn remaining(&self, provider: &str, now: Instant) -> Duration {
        self.entries
            .get(provider)
            .map(|e| e.remaining(now))
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_available(&self, provider: &str, now: Instant) -> bool {
        self.remaining(provider, now).is_zero()
    }
}
