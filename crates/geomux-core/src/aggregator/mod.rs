//! The geocode orchestrator.
//!
//! An [`Aggregator`] owns the provider registry, the scheduler stack, the
//! candidate pipeline and an optional cache. One [`Aggregator::geocode`] call
//! runs a full cycle: cache check, scheduler reset, dispatch loop, final
//! picker call, cache store.

mod dispatch;
mod setup;

use std::collections::HashSet;
use std::sync::Arc;

use crate::backoff::BackoffPolicy;
use crate::cache::{self, GeocodeCache};
use crate::error::{BuildError, ConfigError};
use crate::normalize::Normalizer;
use crate::pipeline::{CandidateFilter, Picker};
use crate::provider::{Provider, ProviderRegistry};
use crate::response::{Candidate, ResponseEnvelope};
use crate::scheduler::{self, Clock, Scheduler, SchedulerKind, SystemClock};

/// Parameters of one geocode call.
#[derive(Debug, Clone, Default)]
pub struct GeocodeRequest {
    pub location: String,
    /// Bypass the cache for this call (no lookup, no store).
    pub no_cache: bool,
    /// Sleep until a backed-off provider becomes eligible instead of giving up.
    pub wait_for_retries: bool,
    /// Providers not to call this time.
    pub skip: HashSet<String>,
}

impl GeocodeRequest {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn wait_for_retries(mut self, wait: bool) -> Self {
        self.wait_for_retries = wait;
        self
    }

    pub fn skip(mut self, provider: impl Into<String>) -> Self {
        self.skip.insert(provider.into());
        self
    }
}

/// Result of one geocode call.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeOutcome {
    pub candidate: Option<Candidate>,
    /// 200/210 with a candidate; 401 when providers answered but nothing was
    /// accepted; 402 when no provider produced a usable answer.
    pub status_code: u16,
    pub from_cache: bool,
    /// One envelope per provider call, in call order.
    pub responses: Vec<ResponseEnvelope>,
}

/// Geocoding orchestrator over a set of providers.
pub struct Aggregator {
    registry: ProviderRegistry,
    scheduler: Box<dyn Scheduler>,
    filter: CandidateFilter,
    picker: Option<Picker>,
    cache: Option<Box<dyn GeocodeCache>>,
    normalizer: Option<Normalizer>,
    clock: Arc<dyn Clock>,
    cache_misses: bool,
}

impl Aggregator {
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::default()
    }

    /// Register a provider; duplicates are rejected (first wins).
    pub fn add_provider(&mut self, provider: Box<dyn Provider>) -> bool {
        if !self.registry.register(provider) {
            return false;
        }
        self.scheduler.set_providers(&self.registry.descriptors());
        true
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn set_filter(&mut self, filter: CandidateFilter) {
        self.filter = filter;
    }

    pub fn set_filter_preset(&mut self, preset: &str) -> Result<(), ConfigError> {
        self.filter = preset.parse()?;
        Ok(())
    }

    pub fn set_picker(&mut self, picker: Picker) {
        self.picker = Some(picker);
    }

    pub fn set_picker_preset(&mut self, preset: &str) -> Result<(), ConfigError> {
        self.picker = Some(preset.parse()?);
        Ok(())
    }

    /// Drop the picker: the first filtered candidate is accepted immediately.
    pub fn clear_picker(&mut self) {
        self.picker = None;
    }

    /// Cache key for a raw location string.
    pub fn cache_key(&self, location: &str) -> String {
        match &self.normalizer {
            Some(normalize) => normalize(location),
            None => location.to_string(),
        }
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("providers", &self.registry)
            .field("filter", &self.filter)
            .field("picker", &self.picker)
            .field("cache", &self.cache.is_some())
            .field("cache_misses", &self.cache_misses)
            .finish()
    }
}

/// Construction options for [`Aggregator`].
pub struct AggregatorBuilder {
    scheduler: SchedulerKind,
    use_timeouts: bool,
    backoff: BackoffPolicy,
    cache: Option<Box<dyn GeocodeCache>>,
    normalizer: Option<Normalizer>,
    clock: Arc<dyn Clock>,
    cache_misses: bool,
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self {
            scheduler: SchedulerKind::default(),
            use_timeouts: false,
            backoff: BackoffPolicy::default(),
            cache: None,
            normalizer: None,
            clock: Arc::new(SystemClock),
            cache_misses: false,
        }
    }
}

impl AggregatorBuilder {
    pub fn scheduler(mut self, kind: SchedulerKind) -> Self {
        self.scheduler = kind;
        self
    }

    /// Put failing providers in exponential backoff.
    pub fn use_timeouts(mut self, on: bool) -> Self {
        self.use_timeouts = on;
        self
    }

    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    pub fn cache(mut self, cache: Box<dyn GeocodeCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn location_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Also store "no result" outcomes in the cache.
    pub fn cache_misses(mut self, on: bool) -> Self {
        self.cache_misses = on;
        self
    }

    /// Assemble the aggregator. A configured cache must pass its self-test.
    pub fn build(self) -> Result<Aggregator, BuildError> {
        if let Some(c) = &self.cache {
            cache::self_test(c.as_ref()).map_err(BuildError::CacheSelfTest)?;
        }
        let scheduler = scheduler::build(
            self.scheduler,
            self.use_timeouts,
            self.backoff,
            Arc::clone(&self.clock),
        );
        Ok(Aggregator {
            registry: ProviderRegistry::new(),
            scheduler,
            filter: CandidateFilter::default(),
            picker: None,
            cache: self.cache,
            normalizer: self.normalizer,
            clock: self.clock,
            cache_misses: self.cache_misses,
        })
    }
}

#[cfg(test)]
mod tests;
