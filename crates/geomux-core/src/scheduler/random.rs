//! Weighted random selection without replacement.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::cycle::Cycle;
use super::{ProviderDescriptor, Scheduler};

/// Draws among providers not yet tried this cycle with probability
/// proportional to weight, renormalized over what remains on every draw.
#[derive(Debug, Clone)]
pub struct WeightedRandom {
    providers: Vec<ProviderDescriptor>,
    cycle: Cycle,
    rng: StdRng,
}

impl WeightedRandom {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible draws for tests and simulations.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            providers: Vec::new(),
            cycle: Cycle::default(),
            rng,
        }
    }
}

impl Default for WeightedRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for WeightedRandom {
    fn set_providers(&mut self, providers: &[ProviderDescriptor]) {
        self.providers = providers.to_vec();
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
        let open: Vec<&ProviderDescriptor> = self
            .providers
            .iter()
            .filter(|p| !self.cycle.contains(&p.name) && eligible(&p.name))
            .collect();
        let total: u64 = open.iter().map(|p| u64::from(p.weight)).sum();
        if total == 0 {
            return None;
        }

        let mut ticket = self.rng.gen_range(0..total);
        let mut pick = open[open.len() - 1].name.clone();
        for p in &open {
            let w = u64::from(p.weight);
            if ticket < w {
                pick = p.name.clone();
                break;
            }
            ticket -= w;
        }
        self.cycle.offer(&pick);
        Some(pick)
    }
}
