//! Uniqueness decorator.

use super::cycle::Cycle;
use super::{NextAvailable, ProviderDescriptor, Scheduler};

/// Guarantees each provider is offered at most once per cycle, whatever the
/// wrapped policy does.
///
/// A wrapped policy that hands back a name already offered (or one it was
/// never given) is misbehaving; the pick is logged, discarded, and redrawn.
#[derive(Debug, Clone)]
pub struct Unique<S> {
    inner: S,
    names: Vec<String>,
    cycle: Cycle,
}

impl<S: Scheduler> Unique<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            names: Vec::new(),
            cycle: Cycle::default(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Scheduler> Scheduler for Unique<S> {
    fn set_providers(&mut self, providers: &[ProviderDescriptor]) {
        self.names = providers.iter().map(|p| p.name.clone()).collect();
        self.inner.set_providers(providers);
    }

    fn reset_available(&mut self) {
        self.cycle.reset();
        self.inner.reset_available();
    }

    fn pending(&self) -> Vec<String> {
        self.names
            .iter()
            .filter(|n| !self.cycle.contains(n))
            .cloned()
            .collect()
    }

    fn next_available_where(&self, eligible: &dyn Fn(&str) -> bool) -> NextAvailable {
        if self.cycle.len() >= self.names.len() {
            return NextAvailable::Done;
        }
        let cycle = &self.cycle;
        self.inner
            .next_available_where(&|n| !cycle.contains(n) && eligible(n))
    }

    fn next_where(&mut self, eligible: &dyn Fn(&str) -> bool) -> Option<String> {
        // Each rejected pick burns one attempt; a sane policy needs one.
        for _ in 0..=self.names.len() {
            let cycle = &self.cycle;
            let pick = self
                .inner
                .next_where(&|n| !cycle.contains(n) && eligible(n))?;
            if self.cycle.contains(&pick) {
                tracing::error!(provider = %pick, "scheduler offered a provider twice in one cycle");
                continue;
            }
            if !self.names.iter().any(|n| *n == pick) {
                tracing::error!(provider = %pick, "scheduler offered an unknown provider");
                continue;
            }
            self.cycle.offer(&pick);
            return Some(pick);
        }
        None
    }

    fn process_feedback(&mut self, provider: &str, feedback: super::Feedback) {
        self.inner.process_feedback(provider, feedback);
    }
}
