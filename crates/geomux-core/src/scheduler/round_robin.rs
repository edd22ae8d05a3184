//! Weighted round robin via running credits.

use super::cycle::Cycle;
use super::{ProviderDescriptor, Scheduler};

/// Each pick adds every provider's weight to its credit, then offers (and
/// zeroes) the highest-credit provider not yet tried this cycle.
///
/// Credits persist across cycles, so over many requests each provider is
/// picked first roughly in proportion to its weight.
#[derive(Debug, Clone, Default)]
pub struct WeightedRoundRobin {
    providers: Vec<ProviderDescriptor>,
    credits: Vec<u64>,
    cycle: Cycle,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current credit for a provider (mostly for diagnostics).
    pub fn credit(&self, name: &str) -> Option<u64> {
        self.providers
            .iter()
            .position(|p| p.name == name)
            .map(|i| self.credits[i])
    }
}

impl Scheduler for WeightedRoundRobin {
    fn set_providers(&mut self, providers: &[ProviderDescriptor]) {
        let credits = providers
            .iter()
            .map(|p| self.credit(&p.name).unwrap_or(0))
            .collect();
        self.providers = providers.to_vec();
        self.credits = credits;
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
        let open: Vec<usize> = (0..self.providers.len())
            .filter(|&i| {
                let name = &self.providers[i].name;
                !self.cycle.contains(name) && eligible(name)
            })
            .collect();
        if open.is_empty() {
            return None;
        }

        for (credit, p) in self.credits.iter_mut().zip(&self.providers) {
            *credit = credit.saturating_add(u64::from(p.weight));
        }

        let mut best = open[0];
        for &i in &open[1..] {
            if self.credits[i] > self.credits[best] {
                best = i;
            }
        }
        self.credits[best] = 0;
        let pick = self.providers[best].name.clone();
        self.cycle.offer(&pick);
        Some(pick)
    }
}
