//! Backoff decorator: keeps providers in timeout out of rotation.

use std::sync::Arc;
use std::time::Duration;

use crate::backoff::{BackoffPolicy, BackoffTable};

use super::{Clock, Feedback, NextAvailable, ProviderDescriptor, Scheduler};

/// Wraps a scheduler and suppresses providers whose backoff has not expired.
///
/// Failing feedback puts the provider in exponential timeout; success clears
/// it. Backoff state lives here and outlives individual cycles.
pub struct Selective<S> {
    inner: S,
    table: BackoffTable,
    clock: Arc<dyn Clock>,
}

impl<S: Scheduler> Selective<S> {
    pub fn new(inner: S, policy: BackoffPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            table: BackoffTable::new(policy),
            clock,
        }
    }

    /// Read access to the backoff bookkeeping.
    pub fn backoff(&self) -> &BackoffTable {
        &self.table
    }
}

impl<S: Scheduler> Scheduler for Selective<S> {
    fn set_providers(&mut self, providers: &[ProviderDescriptor]) {
        self.inner.set_providers(providers);
    }

    fn reset_available(&mut self) {
        self.inner.reset_available();
    }

    fn pending(&self) -> Vec<String> {
        self.inner.pending()
    }

    fn next_available_where(&self, eligible: &dyn Fn(&str) -> bool) -> NextAvailable {
        if self.inner.next_available_where(eligible).is_done() {
            return NextAvailable::Done;
        }
        let now = self.clock.now();
        self.inner
            .pending()
            .iter()
            .filter(|name| eligible(name))
            .map(|name| self.table.remaining(name, now))
            .min()
            .map_or(NextAvailable::Done, NextAvailable::After)
    }

    fn next_where(&mut self, eligible: &dyn Fn(&str) -> bool) -> Option<String> {
        let now = self.clock.now();
        let table = &self.table;
        self.inner
            .next_where(&|n| eligible(n) && table.is_available(n, now))
    }

    fn process_feedback(&mut self, provider: &str, feedback: Feedback) {
        if feedback.is_success() {
            self.table.record_success(provider);
        } else {
            let delay: Duration = self.table.record_failure(provider, self.clock.now());
            tracing::debug!(
                provider,
                status = feedback.status_code,
                backoff_ms = delay.as_millis() as u64,
                "provider failed; backing off"
            );
        }
        self.inner.process_feedback(provider, feedback);
    }
}
