//! Building an aggregator from the on-disk configuration.

use anyhow::{Context, Result};

use crate::cache::JsonFileCache;
use crate::config::GeomuxConfig;
use crate::normalize::default_normalizer;
use crate::provider::build_provider;

use super::Aggregator;

impl Aggregator {
    /// Build an aggregator with the scheduler, cache, pipeline presets and
    /// providers described by `cfg`.
    pub fn from_config(cfg: &GeomuxConfig) -> Result<Aggregator> {
        let mut builder = Aggregator::builder()
            .scheduler(cfg.scheduler)
            .use_timeouts(cfg.use_timeouts)
            .backoff(cfg.backoff_policy())
            .cache_misses(cfg.cache.cache_misses);

        if cfg.cache.normalize_locations {
            builder = builder.location_normalizer(default_normalizer());
        }
        if cfg.cache.enabled {
            let path = match &cfg.cache.path {
                Some(p) => p.clone(),
                None => JsonFileCache::default_path()?,
            };
            let cache = JsonFileCache::open(&path)?;
            builder = builder.cache(Box::new(cache));
        }

        let mut aggregator = builder.build().context("build aggregator")?;
        aggregator
            .set_filter_preset(&cfg.filter)
            .context("filter preset")?;
        aggregator
            .set_picker_preset(&cfg.picker)
            .context("picker preset")?;

        for provider_cfg in &cfg.providers {
            let provider = build_provider(provider_cfg)?;
            aggregator.add_provider(provider);
        }
        if aggregator.providers().is_empty() {
            tracing::warn!("configuration lists no providers");
        }
        Ok(aggregator)
    }
}
