//! Result caches consulted before any provider is called.
//!
//! The aggregator only needs atomic `get`/`set` on string keys. A cache is
//! validated once, when the aggregator is built, with a throwaway round trip.

mod file;

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::response::Candidate;

pub use file::JsonFileCache;

/// Key used by [`self_test`]; never a real location after normalization.
pub const SELF_TEST_KEY: &str = "__geomux_self_test__";

/// Stored outcome of a geocode call. `candidate: None` records a miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResult {
    pub candidate: Option<Candidate>,
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache encoding: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("cache lock poisoned")]
    Poisoned,
    #[error("self-test: {0}")]
    SelfTest(String),
}

/// Get/set contract the aggregator consumes.
pub trait GeocodeCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CachedResult>, CacheError>;
    fn set(&self, key: &str, value: &CachedResult) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Store a throwaway value and read it back; anything but an exact match fails.
///
/// The test entry is removed again whatever the outcome.
pub fn self_test(cache: &dyn GeocodeCache) -> Result<(), CacheError> {
    let outcome = round_trip(cache);
    let cleanup = cache.remove(SELF_TEST_KEY);
    outcome.and(cleanup)
}

fn round_trip(cache: &dyn GeocodeCache) -> Result<(), CacheError> {
    let sample = CachedResult {
        candidate: Some(Candidate {
            address: Some("self test".to_string()),
            country: None,
            latitude: 12.5,
            longitude: -45.25,
            precision: Some(0.5),
            provider_name: "self_test".to_string(),
            location_query: SELF_TEST_KEY.to_string(),
            status_code: crate::status::OK,
        }),
    };
    cache.set(SELF_TEST_KEY, &sample)?;
    match cache.get(SELF_TEST_KEY)? {
        Some(read) if read == sample => Ok(()),
        Some(_) => Err(CacheError::SelfTest("value read back differs".to_string())),
        None => Err(CacheError::SelfTest("value written was not found".to_string())),
    }
}

/// In-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CachedResult>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GeocodeCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<CachedResult>, CacheError> {
        let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &CachedResult) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

impl<C: GeocodeCache + ?Sized> GeocodeCache for std::sync::Arc<C> {
    fn get(&self, key: &str) -> Result<Option<CachedResult>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &CachedResult) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        (**self).remove(key)
    }
}
