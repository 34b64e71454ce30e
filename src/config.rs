//! Configuration for the search engine and console.
//!
//! Loaded once at startup from `<config_dir>/config.toml` (when present)
//! with environment-variable overrides, then passed by reference into
//! every component constructor. There is no ambient/global configuration
//! lookup anywhere in the crate.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search request behaviour.
    pub search: SearchSettings,
    /// Console rendering settings.
    pub display: DisplaySettings,
    /// Result cache settings.
    pub cache: CacheSettings,
    /// Search history settings.
    pub history: HistorySettings,
    /// Provider selection settings.
    pub api: ApiSettings,
}

/// Search request configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of results per page.
    pub results_per_page: usize,
    /// Outbound request timeout in seconds.
    pub default_timeout: u64,
    /// User-Agent header for metadata fetches. Empty string means the
    /// built-in rotating browser User-Agent list is used.
    pub user_agent: String,
    /// Delay in seconds applied before each live provider request.
    pub request_delay: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            results_per_page: 10,
            default_timeout: 30,
            user_agent: String::new(),
            request_delay: 0.5,
        }
    }
}

/// Console rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Whether to emit ANSI colour codes.
    pub colors: bool,
    /// Maximum snippet length before truncation.
    pub max_snippet_length: usize,
    /// Whether to render per-result metadata.
    pub show_metadata: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            colors: true,
            max_snippet_length: 200,
            show_metadata: true,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Whether caching is enabled at all.
    pub enabled: bool,
    /// Time-to-live for cached search pages, in seconds.
    pub search_ttl: u64,
    /// Maximum number of cached pages before eviction.
    pub max_size: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            search_ttl: 3600,
            max_size: 1000,
        }
    }
}

/// Search history configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of retained history entries.
    pub max_entries: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_entries: 1000 }
    }
}

/// Provider selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Name of the default provider: `"live"` or `"simulated"`.
    pub default_provider: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            default_provider: "live".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults.
    ///
    /// When `path` is `None`, `<config_dir>/config.toml` is tried. A
    /// missing or unreadable file is tolerated with a warning; environment
    /// overrides are applied last either way.
    pub fn load(path: Option<&Path>) -> Self {
        let candidate = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| crate::dirs::config_dir().join("config.toml"));

        let mut config = match std::fs::read_to_string(&candidate) {
            Ok(raw) => match toml::from_str::<Config>(&raw) {
                Ok(config) => {
                    tracing::debug!(path = %candidate.display(), "configuration loaded");
                    config
                }
                Err(err) => {
                    tracing::warn!(
                        path = %candidate.display(),
                        error = %err,
                        "failed to parse config file, using defaults"
                    );
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        };

        config.apply_env_overrides();
        config
    }

    /// Apply `WEBSEARCH_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Some(n) = env_parse::<usize>("WEBSEARCH_RESULTS_PER_PAGE") {
            self.search.results_per_page = n;
        }
        if let Some(n) = env_parse::<u64>("WEBSEARCH_TIMEOUT") {
            self.search.default_timeout = n;
        }
        if let Ok(ua) = std::env::var("WEBSEARCH_USER_AGENT") {
            self.search.user_agent = ua;
        }
        if let Ok(provider) = std::env::var("WEBSEARCH_DEFAULT_PROVIDER") {
            self.api.default_provider = provider;
        }
        if std::env::var_os("WEBSEARCH_NO_COLORS").is_some() {
            self.display.colors = false;
        }
    }

    /// Validates this configuration, returning an error if any field is
    /// invalid.
    ///
    /// Checks:
    /// - `search.results_per_page` must be greater than 0
    /// - `search.default_timeout` must be greater than 0
    /// - `search.request_delay` must not be negative
    /// - `cache.max_size` must be greater than 0 when the cache is enabled
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.search.results_per_page == 0 {
            return Err(SearchError::Config(
                "results_per_page must be greater than 0".into(),
            ));
        }
        if self.search.default_timeout == 0 {
            return Err(SearchError::Config(
                "default_timeout must be greater than 0".into(),
            ));
        }
        if self.search.request_delay < 0.0 {
            return Err(SearchError::Config(
                "request_delay must not be negative".into(),
            ));
        }
        if self.cache.enabled && self.cache.max_size == 0 {
            return Err(SearchError::Config(
                "cache.max_size must be greater than 0 when caching is enabled".into(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
