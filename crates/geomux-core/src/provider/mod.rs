//! Provider capability contract and the adapters shipped with geomux.
//!
//! The aggregator only depends on the [`Provider`] trait and does not know
//! about any specific backend's wire format. Adapters translate their native
//! payloads into [`ProviderRecord`]s; the envelope layer decides which of
//! those are usable.

mod factory;
mod fixture;
mod http;
mod nominatim;
mod registry;

use serde::{Deserialize, Serialize};

pub use factory::{build_provider, ProviderKind};
pub use fixture::FixtureProvider;
pub use nominatim::NominatimProvider;
pub use registry::ProviderRegistry;

/// One result in a provider's reply, already mapped to common field names.
///
/// Coordinates are optional here: providers sometimes return entries that
/// are not georeferenced, and those are dropped when the reply is wrapped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub precision: Option<f64>,
}

impl ProviderRecord {
    pub fn is_georeferenced(&self) -> bool {
        matches!(
            (self.latitude, self.longitude),
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite()
        )
    }
}

/// Reply from one provider call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderReply {
    pub records: Vec<ProviderRecord>,
    /// Explicit status; `None` lets the envelope derive 200 or 401.
    pub status_code: Option<u16>,
}

impl ProviderReply {
    /// Reply carrying records, status derived from their content.
    pub fn found(records: Vec<ProviderRecord>) -> Self {
        Self {
            records,
            status_code: None,
        }
    }

    /// Reply with no records and an explicit status (e.g. quota exhausted).
    pub fn status(status_code: u16) -> Self {
        Self {
            records: Vec::new(),
            status_code: Some(status_code),
        }
    }
}

/// Error raised by a provider call that could not produce a reply at all.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    #[error("malformed reply: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("{0}")]
    Other(String),
}

/// A geocoding backend.
pub trait Provider: Send + Sync {
    /// Unique key used by the registry and the scheduler.
    fn name(&self) -> &str;

    /// Daily request quota; used as the scheduling weight.
    fn daily_limit(&self) -> u32;

    /// Forward geocode a location string.
    ///
    /// Runs in the current thread.
    fn geocode(&self, location: &str) -> Result<ProviderReply, ProviderError>;
}
