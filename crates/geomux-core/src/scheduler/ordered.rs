//! Strict priority by descending weight.

use super::cycle::Cycle;
use super::{ProviderDescriptor, Scheduler};

/// Always offers the heaviest provider not yet tried this cycle.
///
/// Ties keep registration order.
#[derive(Debug, Clone, Default)]
pub struct OrderedList {
    providers: Vec<ProviderDescriptor>,
    cycle: Cycle,
}

impl OrderedList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for OrderedList {
    fn set_providers(&mut self, providers: &[ProviderDescriptor]) {
        let mut sorted = providers.to_vec();
        // Stable sort keeps insertion order among equal weights.
        sorted.sort_by(|a, b| b.weight.cmp(&a.weight));
        self.providers = sorted;
    }

    fn reset_available(&mut self) {
        self.cycle.reset();
    }

    fn pending(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| !self.cycle.contains(&p.name))
            .map(|p| p.name.clone())
            .collect()
    }

    fn next_where(&mut self, eligible: &dyn Fn(&str) -> bool) -> Option<String> {
        let pick = self
            .providers
            .iter()
            .find(|p| !self.cycle.contains(&p.name) && eligible(&p.name))?
            .name
            .clone();
        self.cycle.offer(&pick);
        Some(pick)
    }
}
