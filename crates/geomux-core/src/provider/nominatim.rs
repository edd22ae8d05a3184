//! Nominatim-compatible search adapter (OpenStreetMap, geocode.maps.co).

use std::time::Duration;

use serde::Deserialize;

use crate::status;

use super::http;
use super::{Provider, ProviderError, ProviderRecord, ProviderReply};

/// Public OpenStreetMap endpoint.
pub const OSM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
/// geocode.maps.co endpoint (Nominatim payload, API key required).
pub const MAPSCO_ENDPOINT: &str = "https://geocode.maps.co/search";

const MAX_RESULTS: usize = 5;
/// Nominatim `place_rank` runs from 0 (planet) to 30 (building).
const MAX_PLACE_RANK: f64 = 30.0;

/// Adapter for any service speaking the Nominatim search API.
#[derive(Debug, Clone)]
pub struct NominatimProvider {
    name: String,
    endpoint: String,
    api_key: Option<String>,
    daily_limit: u32,
    timeout: Duration,
}

impl NominatimProvider {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, daily_limit: u32) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key: None,
            daily_limit,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn search_url(&self, location: &str) -> Result<url::Url, url::ParseError> {
        let limit = MAX_RESULTS.to_string();
        let mut params = vec![
            ("q", location),
            ("format", "jsonv2"),
            ("addressdetails", "1"),
            ("limit", limit.as_str()),
        ];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("api_key", key));
        }
        url::Url::parse_with_params(&self.endpoint, &params)
    }
}

impl Provider for NominatimProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    fn geocode(&self, location: &str) -> Result<ProviderReply, ProviderError> {
        let url = self.search_url(location)?;
        let response = http::get(url.as_str(), self.timeout)?;
        if !(200..300).contains(&response.code) {
            tracing::debug!(provider = %self.name, code = response.code, "search returned non-2xx");
            return Ok(ProviderReply::status(status::from_http(response.code)));
        }
        let records = parse_results(&response.body)?;
        Ok(ProviderReply::found(records))
    }
}

#[derive(Deserialize)]
struct SearchResult {
    lat: Option<String>,
    lon: Option<String>,
    display_name: Option<String>,
    place_rank: Option<u32>,
    address: Option<Address>,
}

#[derive(Deserialize)]
struct Address {
    country: Option<String>,
}

/// Decode a Nominatim `jsonv2` search body into provider records.
///
/// Unparseable coordinates become `None` rather than failing the reply.
fn parse_results(body: &[u8]) -> Result<Vec<ProviderRecord>, serde_json::Error> {
    let results: Vec<SearchResult> = serde_json::from_slice(body)?;
    Ok(results
        .into_iter()
        .take(MAX_RESULTS)
        .map(|r| ProviderRecord {
            address: r.display_name,
            country: r.address.and_then(|a| a.country),
            latitude: r.lat.as_deref().and_then(|s| s.trim().parse().ok()),
            longitude: r.lon.as_deref().and_then(|s| s.trim().parse().ok()),
            precision: r
                .place_rank
                .map(|rank| (f64::from(rank) / MAX_PLACE_RANK).min(1.0)),
        })
        .collect())
}
