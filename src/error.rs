//! Error types for the websearch crate.
//!
//! All errors carry stable string messages suitable for display to users
//! and for programmatic handling. Provider-internal failures are recovered
//! before they reach the caller; the variants here are the ones a caller
//! can actually observe.

/// Errors that can occur during search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A filter or query parameter failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A search provider failed to fetch results.
    #[error("provider error: {0}")]
    Provider(String),

    /// Failed to parse a provider response or a fetched page.
    #[error("parse error: {0}")]
    Parse(String),

    /// Pagination or lookup past the available bounds.
    #[error("not found: {0}")]
    NotFound(String),

    /// Unknown export format requested.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// History load/save failure. Logged and degraded, never fatal.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for websearch results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_validation() {
        let err = SearchError::Validation("invalid date range: soon".into());
        assert_eq!(err.to_string(), "validation error: invalid date range: soon");
    }

    #[test]
    fn display_provider() {
        let err = SearchError::Provider("connection refused".into());
        assert_eq!(err.to_string(), "provider error: connection refused");
    }

    #[test]
    fn display_not_found() {
        let err = SearchError::NotFound("already on first page".into());
        assert_eq!(err.to_string(), "not found: already on first page");
    }

    #[test]
    fn display_unsupported_format() {
        let err = SearchError::UnsupportedFormat("xml".into());
        assert_eq!(err.to_string(), "unsupported export format: xml");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SearchError = io.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
