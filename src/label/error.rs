//! Error types for label search operations.
//!
//! Every failure carries the human-readable message that ends up in a name's
//! failed outcome. "No matches" responses are split out so the resolver can
//! use them to drive fallback without treating them as hard failures.

use thiserror::Error;

/// Substring (case-insensitive) the API uses to report an empty result set.
const NO_MATCHES_MARKER: &str = "no matches found";

/// Errors that can occur during a label search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The query ran but matched nothing
    #[error("{message}")]
    NoMatches {
        /// Message reported by the API
        message: String,
    },

    /// Network, HTTP status, or response decoding failure
    #[error("{message}")]
    Transport {
        /// HTTP status when a response was received
        status: Option<u16>,
        /// Human-readable failure description
        message: String,
    },

    /// A successful response carrying a body-level error
    #[error("{message}")]
    Api {
        /// Message reported by the API
        message: String,
    },
}

impl SearchError {
    /// Creates an error for a non-2xx response.
    ///
    /// Uses the body's error message when present, otherwise `HTTP <status>`.
    #[must_use]
    pub fn http_status(status: u16, body_message: Option<String>) -> Self {
        let message = body_message.unwrap_or_else(|| format!("HTTP {status}"));
        if is_no_matches_message(&message) {
            return Self::NoMatches { message };
        }
        Self::Transport {
            status: Some(status),
            message,
        }
    }

    /// Creates an error for a 2xx response whose body carries an error field.
    #[must_use]
    pub fn api(message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| "Unknown API error".to_string());
        if is_no_matches_message(&message) {
            return Self::NoMatches { message };
        }
        Self::Api { message }
    }

    /// Creates an error for a connection or decoding failure.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// True for the "query matched nothing" sub-kind.
    #[must_use]
    pub fn is_no_matches(&self) -> bool {
        matches!(self, Self::NoMatches { .. })
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NoMatches { message }
            | Self::Transport { message, .. }
            | Self::Api { message } => message,
        }
    }
}

fn is_no_matches_message(message: &str) -> bool {
    message.to_lowercase().contains(NO_MATCHES_MARKER)
}
