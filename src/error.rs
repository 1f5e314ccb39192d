//! Error types for URL parsing, mutation and suffix list resolution.

use thiserror::Error;

/// Errors that can occur while parsing, mutating or decomposing a URL.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UrlError {
    /// Malformed input: empty URL, bad scheme, bad host component, bad port,
    /// a path carrying `#`/`?`, or an empty query-string separator.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The host could not be matched against any suffix rule.
    #[error("TLD resolution failed: {0}")]
    TldResolution(String),

    /// Host component access was attempted while suffix list usage is disabled.
    #[error("Public suffix list usage is disabled")]
    TldDisabled,

    /// The operation is not valid in the value's current state.
    #[error("Logic error: {0}")]
    Logic(String),

    /// Fetching or caching the suffix list failed and no fallback was available.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl UrlError {
    /// True for both TLD resolution failures and disabled-list errors.
    pub fn is_tld_error(&self) -> bool {
        matches!(self, UrlError::TldResolution(_) | UrlError::TldDisabled)
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        UrlError::InvalidArgument(msg.into())
    }

    pub(crate) fn no_valid_tld(host: &str) -> Self {
        UrlError::TldResolution(format!("no valid TLD in host '{}'", host))
    }
}

impl From<::url::ParseError> for UrlError {
    fn from(err: ::url::ParseError) -> Self {
        UrlError::InvalidArgument(err.to_string())
    }
}

impl From<std::io::Error> for UrlError {
    fn from(err: std::io::Error) -> Self {
        UrlError::Runtime(err.to_string())
    }
}

impl From<serde_json::Error> for UrlError {
    fn from(err: serde_json::Error) -> Self {
        UrlError::Runtime(format!("suffix list cache is unreadable: {}", err))
    }
}
