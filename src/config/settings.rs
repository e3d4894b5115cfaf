//! Settings structures for ga-search configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub sources: SourceSettings,
    pub outgoing: OutgoingSettings,
    pub history: HistorySettings,
    pub cache: CacheSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (GA_SEARCH_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("GA_SEARCH_TYPES") {
            self.search.types = split_list(&val);
        }
        if let Ok(val) = std::env::var("GA_SEARCH_LANG") {
            self.search.lang = Some(val);
        }
        if let Ok(val) = std::env::var("GA_SEARCH_SR") {
            self.search.sr = val;
        }
        if let Ok(val) = std::env::var("GA_SEARCH_MINLENGTH") {
            if let Ok(min_length) = val.parse() {
                self.search.min_length = min_length;
            }
        }
        if let Ok(val) = std::env::var("GA_SEARCH_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.search.limit = limit;
            }
        }
        if let Ok(val) = std::env::var("GA_SEARCH_FEATURE_LAYERS") {
            self.search.feature_layers = Some(val);
        }
        if let Ok(val) = std::env::var("GA_SEARCH_HISTORY") {
            self.history.enabled = val.parse().unwrap_or(true);
        }
        if let Ok(val) = std::env::var("GA_SEARCH_HISTORY_DIR") {
            self.history.storage_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("GA_SEARCH_GEOADMIN_URL") {
            self.sources.geoadmin_url = val;
        }
        if let Ok(val) = std::env::var("GA_SEARCH_PHOTON_URL") {
            self.sources.photon_url = val;
        }
    }
}

/// Split a comma separated list, dropping empty items
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Minimum input length that triggers the remote sources
    pub min_length: usize,
    /// Result limit sent to every backend
    pub limit: usize,
    /// How the limit applies to the merged list
    pub limit_policy: LimitPolicy,
    /// Quiet period after the last keystroke, in milliseconds
    pub debounce_ms: u64,
    /// Enabled sources, in merge order
    pub types: Vec<String>,
    /// Explicit language; falls back to `default_lang`
    pub lang: Option<String>,
    /// Host language used when `lang` is unset
    pub default_lang: String,
    /// Spatial reference code of returned geometries
    pub sr: String,
    /// Origins searched by the location source
    pub location_origins: String,
    /// Layers searched by the feature source
    pub feature_layers: Option<String>,
    /// Per-source timeout in seconds
    pub source_timeout: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_length: 1,
            limit: 15,
            limit_policy: LimitPolicy::default(),
            debounce_ms: 200,
            types: vec!["location".to_string()],
            lang: None,
            default_lang: "en".to_string(),
            sr: "4326".to_string(),
            location_origins: "zipcode,gg25".to_string(),
            feature_layers: None,
            source_timeout: 5.0,
        }
    }
}

/// Where the result limit is enforced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Also applied once to the merged list, keeping earlier sources first
    #[default]
    Merged,
    /// Only sent to each backend; the merged list may be longer
    PerSource,
}

/// Backend endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// geo.admin.ch SearchServer endpoint
    pub geoadmin_url: String,
    /// Photon geocoder endpoint
    pub photon_url: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            geoadmin_url: "https://api3.geo.admin.ch/rest/services/api/SearchServer".to_string(),
            photon_url: "https://photon.komoot.io/api/".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// User agent sent to the backends
    pub useragent: String,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            useragent: format!("ga-search/{}", env!("CARGO_PKG_VERSION")),
            pool_maxsize: 10,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Convert a configured number of seconds into a [`Duration`]
///
/// Negative, non-finite and out-of-range values fall back to `default_secs`.
pub fn seconds(name: &str, secs: f64, default_secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_else(|_| {
        warn!("Invalid {} of {} seconds, using {}", name, secs, default_secs);
        Duration::from_secs_f64(default_secs)
    })
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// History settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Record submissions and offer them for short inputs
    pub enabled: bool,
    /// Number of entries kept
    pub capacity: usize,
    /// Directory of the history file; platform data dir when unset
    pub storage_dir: Option<PathBuf>,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: crate::history::DEFAULT_CAPACITY,
            storage_dir: None,
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Time to live in seconds
    pub ttl: u64,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: 60,
            max_capacity: 1000,
        }
    }
}
