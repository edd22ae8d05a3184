use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backoff::BackoffPolicy;
use crate::provider::ProviderKind;
use crate::scheduler::SchedulerKind;

/// Backoff parameters for providers that fail (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Timeout after the first consecutive failure, in seconds (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum timeout in seconds.
    pub max_delay_secs: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_secs: 1.0,
            max_delay_secs: 300,
        }
    }
}

impl BackoffConfig {
    pub fn to_policy(&self) -> BackoffPolicy {
        let base = Duration::try_from_secs_f64(self.base_delay_secs.max(0.0)).unwrap_or_default();
        BackoffPolicy::new(base, Duration::from_secs(self.max_delay_secs))
    }
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Also remember queries that produced no result.
    #[serde(default)]
    pub cache_misses: bool,
    /// Key the cache by the canonical form of the location (case and whitespace folded).
    #[serde(default = "default_true")]
    pub normalize_locations: bool,
    /// Cache file; defaults to `~/.local/state/geomux/cache.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_misses: false,
            normalize_locations: true,
            path: None,
        }
    }
}

/// One `[[providers]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    /// Requests per day; also the provider's scheduling weight.
    pub daily_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Fixture table (kind = "fixture" only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Global configuration loaded from `~/.config/geomux/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeomuxConfig {
    /// Scheduling policy: ordered_list, weighted_round_robin, or weighted_random.
    #[serde(default)]
    pub scheduler: SchedulerKind,
    /// Put failing providers in exponential backoff.
    #[serde(default)]
    pub use_timeouts: bool,
    /// Filter preset ("all", "min_precision:<t>", "country:<name>").
    #[serde(default)]
    pub filter: String,
    /// Picker preset ("first", "max_precision", "consensus:<n>:<nearness>").
    #[serde(default)]
    pub picker: String,
    /// Optional backoff policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub backoff: Option<BackoffConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl Default for GeomuxConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerKind::default(),
            use_timeouts: false,
            filter: "all".to_string(),
            picker: "first".to_string(),
            backoff: None,
            cache: CacheConfig::default(),
            providers: vec![ProviderConfig {
                name: "osm".to_string(),
                kind: ProviderKind::Nominatim,
                daily_limit: 1000,
                endpoint: None,
                api_key: None,
                path: None,
            }],
        }
    }
}

impl GeomuxConfig {
    pub fn backoff_policy(&self) -> BackoffPolicy {
        self.backoff.clone().unwrap_or_default().to_policy()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("geomux")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GeomuxConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GeomuxConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file (no default is written).
pub fn load_from_path(path: &Path) -> Result<GeomuxConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: GeomuxConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
