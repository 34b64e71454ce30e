//! Interactive console frontend.
//!
//! A plain line is a search query; lines starting with `:` are
//! commands. The loop never exits on a failed search — errors render
//! as messages and the prompt returns.

use std::io::{self, BufRead, Write};

use crate::engine::WebSearchEngine;
use crate::error::{Result, SearchError};
use crate::export::{export_results, ExportFormat};
use crate::types::SearchResult;

const HELP: &str = "\
Enter a search query, or one of:
  :next              next page of the current search
  :prev              previous page of the current search
  :filter <preset>   apply a filter preset (:filter to list presets)
  :clear-filters     reset filters to defaults
  :history [n]       show the n most recent searches (default 10)
  :clear-history     delete the search history
  :stats             session and engine statistics
  :suggest <text>    query suggestions for a partial input
  :trending          trending search topics
  :export <format>   export current results (json, csv, text)
  :help              this message
  :quit              exit

Query syntax: \"exact phrase\", +required, -excluded,
site:example.com, filetype:pdf";

/// Console session wrapping an engine.
pub struct Console {
    engine: WebSearchEngine,
    colors: bool,
}

impl Console {
    /// Wrap an engine for console interaction.
    pub fn new(engine: WebSearchEngine) -> Self {
        let colors = engine.config().display.colors;
        Self { engine, colors }
    }

    /// Borrow the wrapped engine.
    pub fn engine(&self) -> &WebSearchEngine {
        &self.engine
    }

    /// Consume the console, returning the engine.
    pub fn into_engine(self) -> WebSearchEngine {
        self.engine
    }

    /// Run the interactive loop until `:quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        println!("websearch — type :help for commands");
        loop {
            print!("search> ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input == ":quit" || input == ":q" || input == ":exit" {
                break;
            }
            self.dispatch(input).await;
        }
        Ok(())
    }

    /// Run a sequence of queries non-interactively, one per line.
    pub async fn run_batch(&mut self, queries: &[String]) {
        for query in queries {
            let query = query.trim();
            if query.is_empty() || query.starts_with('#') {
                continue;
            }
            println!("search> {query}");
            self.dispatch(query).await;
        }
    }

    /// Execute one search and render it.
    pub async fn run_single(&mut self, query: &str) {
        self.dispatch(query).await;
    }

    async fn dispatch(&mut self, input: &str) {
        if let Some(command) = input.strip_prefix(':') {
            self.command(command).await;
        } else {
            let (results, total, elapsed) = self.engine.search(input, 1, None, true).await;
            self.render_results(&results, total, elapsed);
        }
    }

    async fn command(&mut self, command: &str) {
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };

        match name {
            "next" => match self.engine.next_page().await {
                Ok((results, total, elapsed)) => self.render_results(&results, total, elapsed),
                Err(err) => self.render_error(&err),
            },
            "prev" | "previous" => match self.engine.previous_page().await {
                Ok((results, total, elapsed)) => self.render_results(&results, total, elapsed),
                Err(err) => self.render_error(&err),
            },
            "filter" => self.apply_preset(arg),
            "clear-filters" => {
                self.engine.filters_mut().clear();
                println!("filters reset to defaults");
            }
            "history" => {
                let limit = arg.parse().unwrap_or(10);
                self.render_history(limit);
            }
            "clear-history" => {
                self.engine.clear_history();
                println!("history cleared");
            }
            "stats" => self.render_stats(),
            "suggest" => {
                if arg.is_empty() {
                    println!("usage: :suggest <partial query>");
                } else {
                    for suggestion in self.engine.suggestions(arg).await {
                        println!("  {suggestion}");
                    }
                }
            }
            "trending" => {
                for topic in self.engine.trending() {
                    println!("  {topic}");
                }
            }
            "export" => match arg.parse::<ExportFormat>() {
                Ok(format) => match export_results(&self.engine, format, true) {
                    Ok(out) if out.is_empty() => println!("nothing to export"),
                    Ok(out) => println!("{out}"),
                    Err(err) => self.render_error(&err),
                },
                Err(err) => self.render_error(&err),
            },
            "help" | "h" => println!("{HELP}"),
            other => {
                let err = SearchError::Validation(format!("unknown command :{other}"));
                self.render_error(&err);
            }
        }
    }

    fn apply_preset(&mut self, name: &str) {
        if name.is_empty() {
            println!("presets: {}", self.engine.filters().preset_names().join(", "));
            return;
        }
        let Some(preset) = self.engine.filters().preset(name).cloned() else {
            let err = SearchError::NotFound(format!("no preset named '{name}'"));
            self.render_error(&err);
            return;
        };
        match self.engine.filters_mut().apply(preset) {
            Ok(()) => println!("filters: {}", self.engine.filters().summary()),
            Err(err) => self.render_error(&err),
        }
    }

    fn render_results(&self, results: &[SearchResult], total: u64, elapsed: f64) {
        if results.is_empty() {
            println!("no results ({elapsed:.2}s)");
            return;
        }
        let stats = self.engine.session_stats();
        println!(
            "page {}/{} — {} total results in {:.2}s",
            stats.current_page, stats.total_pages, total, elapsed
        );
        println!();

        let display = &self.engine.config().display;
        for (i, result) in results.iter().enumerate() {
            let rank = i + 1 + (stats.current_page - 1) * results.len().max(1);
            println!("{}. {}", rank, self.paint(&result.title, "1;34"));
            println!("   {}", self.paint(&result.url, "32"));
            println!("   {}", truncate(&result.snippet, display.max_snippet_length));
            if display.show_metadata {
                println!(
                    "   {}",
                    self.paint(
                        &format!(
                            "{} | {} | score {:.2}",
                            result.source, result.result_type, result.relevance_score
                        ),
                        "90"
                    )
                );
            }
            println!();
        }
    }

    fn render_history(&self, limit: usize) {
        let entries = self.engine.recent_history(limit);
        if entries.is_empty() {
            println!("history is empty");
            return;
        }
        for entry in entries {
            println!(
                "{}  {:<40} {} results, page {}, {:.2}s",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.query,
                entry.results_count,
                entry.page,
                entry.execution_time
            );
        }
    }

    fn render_stats(&self) {
        let session = self.engine.session_stats();
        let totals = self.engine.search_stats();
        println!("session {}", session.session_id);
        if let Some(query) = &session.current_query {
            println!(
                "  current: '{}' page {}/{} ({} results)",
                query, session.current_page, session.total_pages, session.total_results
            );
        }
        println!("  filters: {}", session.active_filters);
        println!(
            "  searches: {} | results returned: {} | avg {:.2}s",
            totals.total_searches, totals.total_results_returned, totals.average_time
        );
        println!(
            "  cache hits: {} | cached pages: {} | history entries: {}",
            totals.cache_hits, totals.cached_pages, totals.history_entries
        );
    }

    fn render_error(&self, err: &SearchError) {
        println!("{}", self.paint(&format!("error: {err}"), "31"));
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colors {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

/// Truncate to a character budget, appending an ellipsis when cut.
fn truncate(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate("short", 200), "short");
    }

    #[test]
    fn truncate_long_text_gets_ellipsis() {
        let long = "a".repeat(250);
        let cut = truncate(&long, 200);
        assert_eq!(cut.chars().count(), 200);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn truncate_zero_budget_is_identity() {
        assert_eq!(truncate("anything", 0), "anything");
    }
}
