//! Explicit mapping from provider configuration to adapter constructors.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

use super::nominatim::{MAPSCO_ENDPOINT, OSM_ENDPOINT};
use super::{FixtureProvider, NominatimProvider, Provider};

/// Known adapter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenStreetMap Nominatim (or a self-hosted instance via `endpoint`).
    Nominatim,
    /// geocode.maps.co; requires `api_key`.
    Mapsco,
    /// Offline table loaded from `path`.
    Fixture,
}

/// Build a provider from its configuration entry.
pub fn build_provider(cfg: &ProviderConfig) -> Result<Box<dyn Provider>> {
    let provider: Box<dyn Provider> = match cfg.kind {
        ProviderKind::Nominatim => {
            let endpoint = cfg.endpoint.as_deref().unwrap_or(OSM_ENDPOINT);
            let mut p = NominatimProvider::new(&cfg.name, endpoint, cfg.daily_limit);
            if let Some(key) = &cfg.api_key {
                p = p.with_api_key(key);
            }
            Box::new(p)
        }
        ProviderKind::Mapsco => {
            let key = cfg
                .api_key
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("provider {}: mapsco requires api_key", cfg.name))?;
            let endpoint = cfg.endpoint.as_deref().unwrap_or(MAPSCO_ENDPOINT);
            Box::new(NominatimProvider::new(&cfg.name, endpoint, cfg.daily_limit).with_api_key(key))
        }
        ProviderKind::Fixture => {
            let path = cfg
                .path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("provider {}: fixture requires path", cfg.name))?;
            Box::new(
                FixtureProvider::load(&cfg.name, cfg.daily_limit, path)
                    .with_context(|| format!("provider {}", cfg.name))?,
            )
        }
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_cfg(kind: ProviderKind) -> ProviderConfig {
        ProviderConfig {
            name: "p".to_string(),
            kind,
            daily_limit: 250,
            endpoint: None,
            api_key: None,
            path: None,
        }
    }

    #[test]
    fn nominatim_needs_nothing_extra() {
        let p = build_provider(&provider_cfg(ProviderKind::Nominatim)).unwrap();
        assert_eq!(p.name(), "p");
        assert_eq!(p.daily_limit(), 250);
    }

    #[test]
    fn mapsco_without_key_is_rejected() {
        let err = build_provider(&provider_cfg(ProviderKind::Mapsco))
            .err()
            .expect("missing key");
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn fixture_without_path_is_rejected() {
        assert!(build_provider(&provider_cfg(ProviderKind::Fixture)).is_err());
    }

    #[test]
    fn kind_parses_from_toml() {
        #[derive(Deserialize)]
        struct W {
            kind: ProviderKind,
        }
        let w: W = toml::from_str(r#"kind = "mapsco""#).unwrap();
        assert_eq!(w.kind, ProviderKind::Mapsco);
    }
}
