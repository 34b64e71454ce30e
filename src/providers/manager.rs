//! Provider selection and fallback.
//!
//! Holds one instance of each provider and routes calls to whichever
//! the configuration names as the default. When the live provider
//! fails outright, the manager logs a warning and retries the same
//! request against the simulated provider so the caller always gets an
//! answer.

use crate::config::Config;
use crate::error::SearchError;
use crate::filters::SearchFilter;
use crate::providers::{LiveProvider, ProviderKind, SearchProvider, SimulatedProvider};
use crate::query::StructuredQuery;
use crate::types::RawResult;

/// Routes search requests to the configured provider, with automatic
/// fallback from live to simulated.
#[derive(Debug)]
pub struct ProviderManager {
    simulated: SimulatedProvider,
    live: LiveProvider,
    default_kind: ProviderKind,
}

impl ProviderManager {
    /// Build both providers and resolve the configured default.
    ///
    /// An unrecognised provider name in the configuration logs a
    /// warning and falls back to the live provider.
    pub fn new(config: &Config) -> Self {
        let default_kind = ProviderKind::from_config_name(&config.api.default_provider)
            .unwrap_or_else(|| {
                tracing::warn!(
                    provider = %config.api.default_provider,
                    "unknown provider name, defaulting to live"
                );
                ProviderKind::Live
            });

        Self {
            simulated: SimulatedProvider::new(config),
            live: LiveProvider::new(config),
            default_kind,
        }
    }

    /// The provider kind requests are routed to first.
    pub fn default_kind(&self) -> ProviderKind {
        self.default_kind
    }

    /// Run a search against the default provider, falling back to
    /// simulation when the live provider fails.
    pub async fn search(
        &self,
        query: &StructuredQuery,
        page: usize,
        filters: &SearchFilter,
    ) -> Result<(Vec<RawResult>, u64), SearchError> {
        match self.default_kind {
            ProviderKind::Simulated => self.simulated.search(query, page, filters).await,
            ProviderKind::Live => match self.live.search(query, page, filters).await {
                Ok(outcome) => Ok(outcome),
                Err(err) => {
                    tracing::warn!(error = %err, "live search failed, using simulation");
                    self.simulated.search(query, page, filters).await
                }
            },
        }
    }

    /// Query suggestions for a partial input, with the same fallback.
    pub async fn suggestions(&self, partial: &str) -> Result<Vec<String>, SearchError> {
        match self.default_kind {
            ProviderKind::Simulated => self.simulated.suggestions(partial).await,
            ProviderKind::Live => match self.live.suggestions(partial).await {
                Ok(suggestions) => Ok(suggestions),
                Err(err) => {
                    tracing::warn!(error = %err, "live suggestions failed, using simulation");
                    self.simulated.suggestions(partial).await
                }
            },
        }
    }

    /// Currently trending search topics.
    pub fn trending(&self) -> Vec<String> {
        [
            "Python programming",
            "Machine learning",
            "Web development",
            "Data science",
            "Artificial intelligence",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulated_config() -> Config {
        let mut config = Config::default();
        config.api.default_provider = "simulated".to_string();
        config
    }

    #[test]
    fn resolves_configured_provider() {
        let manager = ProviderManager::new(&simulated_config());
        assert_eq!(manager.default_kind(), ProviderKind::Simulated);

        let manager = ProviderManager::new(&Config::default());
        assert_eq!(manager.default_kind(), ProviderKind::Live);
    }

    #[test]
    fn unknown_provider_falls_back_to_live() {
        let mut config = Config::default();
        config.api.default_provider = "bing".to_string();
        let manager = ProviderManager::new(&config);
        assert_eq!(manager.default_kind(), ProviderKind::Live);
    }

    #[tokio::test]
    async fn simulated_routing_returns_results() {
        let manager = ProviderManager::new(&simulated_config());
        let query = StructuredQuery::parse("python tutorial");
        let (results, total) = manager
            .search(&query, 1, &SearchFilter::default())
            .await
            .expect("simulated search cannot fail");
        assert!(!results.is_empty());
        assert!(total > 0);
    }

    #[tokio::test]
    async fn suggestions_route_to_simulated() {
        let manager = ProviderManager::new(&simulated_config());
        let suggestions = manager
            .suggestions("rust")
            .await
            .expect("simulated suggestions cannot fail");
        assert_eq!(suggestions.len(), 5);
        assert!(suggestions.iter().all(|s| s.contains("rust")));
    }

    #[test]
    fn trending_topics_are_stable() {
        let manager = ProviderManager::new(&simulated_config());
        let trending = manager.trending();
        assert_eq!(trending.len(), 5);
        assert_eq!(trending[0], "Python programming");
    }
}
