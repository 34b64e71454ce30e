//! Shared HTTP client with User-Agent rotation for outbound requests.
//!
//! Provides a configured [`reqwest::Client`] with browser-like headers,
//! cookie support, and rotating User-Agent strings to avoid bot detection.

use std::time::Duration;

use rand::seq::SliceRandom;

use crate::config::SearchSettings;
use crate::error::SearchError;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] for search and metadata requests.
///
/// The client has:
/// - Cookie store enabled (for engine consent pages)
/// - Timeout from `search.default_timeout`
/// - The configured User-Agent, or a random one from the rotation list
///   when the configured value is empty
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Provider`] if the client cannot be constructed.
pub fn build_client(settings: &SearchSettings) -> Result<reqwest::Client, SearchError> {
    let ua = if settings.user_agent.is_empty() {
        random_user_agent().to_owned()
    } else {
        settings.user_agent.clone()
    };

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(settings.default_timeout))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Provider(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_settings() {
        let settings = SearchSettings::default();
        assert!(build_client(&settings).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let settings = SearchSettings {
            user_agent: "CustomBot/1.0".into(),
            ..SearchSettings::default()
        };
        assert!(build_client(&settings).is_ok());
    }

    #[test]
    fn user_agents_list_not_empty() {
        assert!(!USER_AGENTS.is_empty());
    }
}
