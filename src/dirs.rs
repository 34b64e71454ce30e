//! Application directory paths.
//!
//! Single source of truth for the filesystem locations used by the app.
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//!
//! # Environment Overrides
//!
//! All paths can be overridden for testing or custom deployments:
//! - `WEBSEARCH_DATA_DIR` — overrides [`data_dir`]
//! - `WEBSEARCH_CONFIG_DIR` — overrides [`config_dir`]
//! - `WEBSEARCH_CACHE_DIR` — overrides [`cache_dir`]

use std::path::PathBuf;

/// Application data directory.
///
/// Holds persistent user data, currently the search history file.
/// Resolves to `dirs::data_dir()/websearch/` by default.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("WEBSEARCH_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("websearch"))
        .unwrap_or_else(|| PathBuf::from("/tmp/websearch-data"))
}

/// Application config directory.
///
/// Holds `config.toml`. Resolves to `dirs::config_dir()/websearch/`
/// by default.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("WEBSEARCH_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("websearch"))
        .unwrap_or_else(|| PathBuf::from("/tmp/websearch-config"))
}

/// Application cache directory.
///
/// Reserved for expendable cached data; the result cache itself is
/// in-memory only.
#[must_use]
pub fn cache_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("WEBSEARCH_CACHE_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::cache_dir()
        .map(|d| d.join("websearch"))
        .unwrap_or_else(|| PathBuf::from("/tmp/websearch-cache"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_is_not_empty() {
        assert!(!data_dir().as_os_str().is_empty());
    }

    #[test]
    fn config_dir_is_not_empty() {
        assert!(!config_dir().as_os_str().is_empty());
    }

    #[test]
    fn cache_dir_is_not_empty() {
        assert!(!cache_dir().as_os_str().is_empty());
    }
}
