//! Offline provider answering from a fixed table.
//!
//! The table is keyed by canonical location (see [`crate::normalize`]), so
//! lookups ignore case and surrounding/duplicate whitespace. Handy for demos,
//! air-gapped setups, and for exercising scheduler behaviour without network.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::normalize::canonical_location;

use super::{Provider, ProviderError, ProviderRecord, ProviderReply};

#[derive(Debug, Deserialize)]
struct FixtureFile {
    /// Status returned for every query (e.g. 402 to simulate a spent quota).
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    locations: Vec<FixtureLocation>,
}

#[derive(Debug, Deserialize)]
struct FixtureLocation {
    query: String,
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    records: Vec<ProviderRecord>,
}

/// Table-backed provider.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    name: String,
    daily_limit: u32,
    status: Option<u16>,
    table: HashMap<String, ProviderReply>,
}

impl FixtureProvider {
    pub fn new(name: impl Into<String>, daily_limit: u32) -> Self {
        Self {
            name: name.into(),
            daily_limit,
            status: None,
            table: HashMap::new(),
        }
    }

    /// Answer `query` with the given records.
    pub fn with_location(mut self, query: &str, records: Vec<ProviderRecord>) -> Self {
        self.table
            .insert(canonical_location(query), ProviderReply::found(records));
        self
    }

    /// Answer every query with `status` and no records.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Load a fixture table from a TOML file.
    pub fn load(name: impl Into<String>, daily_limit: u32, path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read fixture: {}", path.display()))?;
        let file: FixtureFile =
            toml::from_str(&data).with_context(|| format!("parse fixture: {}", path.display()))?;
        let mut provider = Self::new(name, daily_limit);
        provider.status = file.status;
        for loc in file.locations {
            let reply = ProviderReply {
                records: loc.records,
                status_code: loc.status,
            };
            provider.table.insert(canonical_location(&loc.query), reply);
        }
        Ok(provider)
    }
}

impl Provider for FixtureProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    fn geocode(&self, location: &str) -> Result<ProviderReply, ProviderError> {
        if let Some(code) = self.status {
            return Ok(ProviderReply::status(code));
        }
        Ok(self
            .table
            .get(&canonical_location(location))
            .cloned()
            .unwrap_or_default())
    }
}
