//! Search providers: pluggable sources of raw results.
//!
//! Two variants exist — an offline simulated provider and a live
//! provider that scrapes a public search engine. The
//! [`manager::ProviderManager`] owns one instance of each and selects
//! the default by [`ProviderKind`], never by runtime type inspection.

pub mod live;
pub mod manager;
pub mod simulated;

use std::fmt;

use crate::error::SearchError;
use crate::filters::SearchFilter;
use crate::query::StructuredQuery;
use crate::types::RawResult;

pub use live::LiveProvider;
pub use manager::ProviderManager;
pub use simulated::SimulatedProvider;

/// Closed set of provider variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Offline deterministic generator used for tests and as fallback.
    Simulated,
    /// Live web search via HTML scraping.
    Live,
}

impl ProviderKind {
    /// Human-readable name of this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Live => "live",
        }
    }

    /// Parse a configured provider name; `None` for unknown names.
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "simulated" | "simulation" => Some(Self::Simulated),
            "live" => Some(Self::Live),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pluggable source of raw search results.
///
/// Implementors return a page of provider-level records plus an estimate
/// of the total result count across all pages. All implementations must
/// be `Send + Sync`.
pub trait SearchProvider: Send + Sync {
    /// Fetch one page of results for a structured query.
    ///
    /// `page` is 1-based; implementations honour a pagination offset of
    /// `(page - 1) * results_per_page`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Provider`] when the source is unreachable.
    /// The manager, not the caller, handles fallback.
    fn search(
        &self,
        query: &StructuredQuery,
        page: usize,
        filters: &SearchFilter,
    ) -> impl std::future::Future<Output = Result<(Vec<RawResult>, u64), SearchError>> + Send;

    /// Query suggestions for a partial input. At most 5, deterministic
    /// order.
    fn suggestions(
        &self,
        partial: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, SearchError>> + Send;

    /// Which variant this implementation is.
    fn kind(&self) -> ProviderKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(ProviderKind::Simulated.name(), "simulated");
        assert_eq!(ProviderKind::Live.name(), "live");
        assert_eq!(ProviderKind::Live.to_string(), "live");
    }

    #[test]
    fn config_name_parsing() {
        assert_eq!(
            ProviderKind::from_config_name("simulated"),
            Some(ProviderKind::Simulated)
        );
        assert_eq!(
            ProviderKind::from_config_name("Simulation"),
            Some(ProviderKind::Simulated)
        );
        assert_eq!(
            ProviderKind::from_config_name("LIVE"),
            Some(ProviderKind::Live)
        );
        assert_eq!(ProviderKind::from_config_name("google"), None);
    }
}
