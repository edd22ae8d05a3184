//! Normalized result shapes: candidate records and per-call envelopes.
//!
//! A provider reply becomes one [`ResponseEnvelope`]. Only records that carry
//! numeric coordinates turn into [`Candidate`]s; everything else is dropped
//! here so the pipeline never sees an ungeoreferenced result.

use serde::{Deserialize, Serialize};

use crate::provider::{ProviderRecord, ProviderReply};
use crate::status;

/// A single normalized geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub address: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Result granularity in `[0, 1]`; `None` means unknown.
    pub precision: Option<f64>,
    pub provider_name: String,
    pub location_query: String,
    pub status_code: u16,
}

impl Candidate {
    /// Build a candidate from a provider record.
    ///
    /// Returns `None` unless both latitude and longitude are present and
    /// finite. Precision is clamped into `[0, 1]`; a NaN precision is
    /// treated as unknown.
    pub fn from_record(
        record: &ProviderRecord,
        provider_name: &str,
        location_query: &str,
        status_code: u16,
    ) -> Option<Self> {
        let latitude = record.latitude.filter(|v| v.is_finite())?;
        let longitude = record.longitude.filter(|v| v.is_finite())?;
        let precision = record
            .precision
            .filter(|p| !p.is_nan())
            .map(|p| p.clamp(0.0, 1.0));
        Some(Self {
            address: record.address.clone(),
            country: record.country.clone(),
            latitude,
            longitude,
            precision,
            provider_name: provider_name.to_string(),
            location_query: location_query.to_string(),
            status_code,
        })
    }

    /// Precision used for ranking: unknown precision ranks below everything.
    pub fn rank(&self) -> f64 {
        self.precision.unwrap_or(f64::NEG_INFINITY)
    }

    /// Copy of this candidate re-labelled as served from the cache.
    pub fn as_cached(&self) -> Self {
        Self {
            status_code: status::CACHED,
            ..self.clone()
        }
    }
}

/// Everything one provider call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub location: String,
    pub records: Vec<Candidate>,
    pub status_code: u16,
    pub provider_name: String,
}

impl ResponseEnvelope {
    /// Wrap a provider reply.
    ///
    /// When the provider did not set a status explicitly, the envelope is
    /// [`status::OK`] if at least one record is georeferenced and
    /// [`status::NOT_FOUND`] otherwise.
    pub fn from_reply(location: &str, provider_name: &str, reply: ProviderReply) -> Self {
        let valid = reply
            .records
            .iter()
            .filter(|r| r.is_georeferenced())
            .count();
        let status_code = reply.status_code.unwrap_or(if valid > 0 {
            status::OK
        } else {
            status::NOT_FOUND
        });
        let records = reply
            .records
            .iter()
            .filter_map(|r| Candidate::from_record(r, provider_name, location, status_code))
            .collect();
        Self {
            location: location.to_string(),
            records,
            status_code,
            provider_name: provider_name.to_string(),
        }
    }

    /// Envelope for a call that produced no usable reply.
    pub fn failed(location: &str, provider_name: &str, status_code: u16) -> Self {
        Self {
            location: location.to_string(),
            records: Vec::new(),
            status_code,
            provider_name: provider_name.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        status::is_success(self.status_code)
    }
}
