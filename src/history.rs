//! Search history: append-only, size-bounded, mirrored to disk.
//!
//! Every mutation persists the full history to a JSON file under the
//! data directory. Load failures degrade to an empty in-memory history
//! with a warning; they are never surfaced to the caller.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::HistorySettings;
use crate::error::{Result, SearchError};
use crate::filters::SearchFilter;

/// One completed search, recorded once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    /// The raw query string.
    pub query: String,
    /// When the search completed.
    pub timestamp: DateTime<Utc>,
    /// Provider's total result estimate for the search.
    pub results_count: u64,
    /// Filters in effect, when any.
    pub filters: Option<SearchFilter>,
    /// Wall-clock execution time in seconds.
    pub execution_time: f64,
    /// Which page was fetched.
    pub page: usize,
    /// Session the search belonged to.
    pub session_id: String,
}

impl SearchHistoryEntry {
    /// Build a validated entry.
    ///
    /// Execution time is clamped to non-negative and page to at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] when the query is empty.
    pub fn new(
        query: &str,
        results_count: u64,
        filters: Option<SearchFilter>,
        execution_time: f64,
        page: usize,
        session_id: &str,
    ) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(SearchError::Validation("query cannot be empty".into()));
        }
        Ok(Self {
            query: query.to_string(),
            timestamp: Utc::now(),
            results_count,
            filters,
            execution_time: execution_time.max(0.0),
            page: page.max(1),
            session_id: session_id.to_string(),
        })
    }
}

/// Manages the bounded, persisted search history.
#[derive(Debug)]
pub struct HistoryManager {
    entries: Vec<SearchHistoryEntry>,
    path: PathBuf,
    max_entries: usize,
}

impl HistoryManager {
    /// Create a manager persisting under `data_dir/search_history.json`,
    /// loading any existing history.
    pub fn new(settings: &HistorySettings, data_dir: &Path) -> Self {
        let path = data_dir.join("search_history.json");
        let entries = load_entries(&path);
        if !entries.is_empty() {
            tracing::debug!(count = entries.len(), "search history loaded");
        }
        Self {
            entries,
            path,
            max_entries: settings.max_entries,
        }
    }

    /// Append an entry, enforce the size bound, persist.
    pub fn add(&mut self, entry: SearchHistoryEntry) {
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            let drop_count = self.entries.len() - self.max_entries;
            self.entries.drain(..drop_count);
        }
        self.persist();
    }

    /// Most recent `limit` entries, oldest-to-newest within the window.
    pub fn recent(&self, limit: usize) -> &[SearchHistoryEntry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }

    /// Remove all entries and persist the empty history.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the history file, logging (not raising) on failure.
    fn persist(&self) {
        if let Err(err) = self.try_persist() {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to save history");
        }
    }

    fn try_persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| SearchError::Persistence(format!("failed to encode history: {e}")))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Load history entries, tolerating a missing or malformed file.
fn load_entries(path: &Path) -> Vec<SearchHistoryEntry> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "malformed history file, starting with empty history"
            );
            Vec::new()
        }
    }
}
