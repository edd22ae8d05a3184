//! Name-keyed registry of providers.

use std::collections::HashMap;

use crate::scheduler::ProviderDescriptor;

use super::Provider;

/// Providers in registration order, indexed by name.
///
/// Registration is first-wins: a second provider with an already registered
/// name is rejected and the original stays in place.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Returns false (and logs a warning) on a duplicate name.
    pub fn register(&mut self, provider: Box<dyn Provider>) -> bool {
        let name = provider.name().to_string();
        if self.index.contains_key(&name) {
            tracing::warn!(provider = %name, "provider already registered; keeping the first one");
            return false;
        }
        self.index.insert(name, self.providers.len());
        self.providers.push(provider);
        true
    }

    pub fn get(&self, name: &str) -> Option<&dyn Provider> {
        self.index.get(name).map(|&i| self.providers[i].as_ref())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Scheduling descriptors in registration order.
    ///
    /// A zero daily limit is raised to a weight of 1 so the provider stays
    /// reachable.
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.providers
            .iter()
            .map(|p| ProviderDescriptor::new(p.name(), p.daily_limit().max(1)))
            .collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}
