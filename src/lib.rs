//! Interactive web search for the console.
//!
//! Parses search queries with operator syntax (quoted phrases,
//! `+required`/`-excluded` terms, `site:` and `filetype:` clauses),
//! dispatches them to a live scraping provider with a simulated
//! fallback, scores and ranks the results, and keeps a cached,
//! paginated, persisted-history session.
//!
//! # Quick Start
//!
//! ```no_run
//! use websearch::{Config, WebSearchEngine};
//!
//! # async fn example() {
//! let mut engine = WebSearchEngine::new(Config::default());
//! let (results, total, elapsed) = engine
//!     .search("rust async \"error handling\" -cpp", 1, None, true)
//!     .await;
//! for result in &results {
//!     println!("{:.2}  {}", result.relevance_score, result.title);
//! }
//! println!("{total} results in {elapsed:.2}s");
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`query`] — raw strings into [`StructuredQuery`]
//! - [`providers`] — the live and simulated providers behind
//!   [`providers::ProviderManager`]
//! - [`filters`] — filter state, presets and post-search filtering
//! - [`cache`] — TTL result cache keyed by query fingerprint
//! - [`history`] — bounded, persisted search history
//! - [`engine`] — the [`WebSearchEngine`] orchestrator
//! - [`export`] — JSON / CSV / text export of the current page
//! - [`console`] — the interactive frontend

pub mod cache;
pub mod config;
pub mod console;
pub mod dirs;
pub mod engine;
pub mod error;
pub mod export;
pub mod filters;
pub mod history;
pub mod http;
pub mod providers;
pub mod query;
pub mod types;

pub use config::Config;
pub use console::Console;
pub use engine::{SearchStats, SessionStats, WebSearchEngine};
pub use error::{Result, SearchError};
pub use export::ExportFormat;
pub use filters::{ContentType, DateRange, FilterManager, SafeSearchLevel, SearchFilter};
pub use history::SearchHistoryEntry;
pub use query::StructuredQuery;
pub use types::{RawResult, ResultType, SearchResult};
