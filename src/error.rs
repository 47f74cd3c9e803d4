// src/error.rs
//! Client error types with structured error handling.
//!
//! Each variant carries enough data (titles, options, versions) to render a
//! precise message without going back to the server.

use crate::constants::UPSTREAM_TIMEOUT_MESSAGES;
use crate::types::{ApiVersion, DisambiguationOption, PageIdentifier, ValidationError};
use thiserror::Error;

/// Main error type for every client operation.
#[derive(Error, Debug)]
pub enum WikiError {
    #[error("{identifier} does not match any pages")]
    PageNotFound { identifier: PageIdentifier },

    #[error("\"{title}\" resulted in a redirect; enable redirect following to resolve it")]
    UnexpectedRedirect { title: String },

    #[error("\"{title}\" may refer to:\n  {}", options.join("\n  "))]
    Disambiguation {
        title: String,
        options: Vec<String>,
        details: Vec<DisambiguationOption>,
    },

    #[error("Searching for \"{query}\" timed out; retry shortly and consider enabling rate limiting")]
    TransportTimeout { query: String },

    #[error("Operation {operation} requires API version {required}+, but {api_url} runs {actual}")]
    UnsupportedApiVersion {
        operation: String,
        required: ApiVersion,
        actual: ApiVersion,
        api_url: String,
    },

    #[error("Operation {operation} requires the {extension} extension, which {api_url} does not have installed")]
    MissingExtension {
        operation: String,
        extension: String,
        api_url: String,
    },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Upstream API error: {message}")]
    Upstream { message: String },

    #[error("{api_url} is not a valid MediaWiki API URL")]
    InvalidApiUrl { api_url: String },

    #[error("Unable to switch {api_url} from language '{old_prefix}' to '{new_prefix}': the URL does not follow the '/<prefix>.' pattern")]
    LanguageChange {
        api_url: String,
        old_prefix: String,
        new_prefix: String,
    },

    #[error("Redirect chain starting at \"{title}\" exceeded {limit} hops")]
    RedirectChainTooLong { title: String, limit: usize },

    #[error("Network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),
}

impl WikiError {
    /// Classifies an upstream `error.info` message.
    ///
    /// Two messages are known to signal a server-side timeout; anything
    /// else becomes a generic upstream error.
    pub fn from_upstream_info(info: &str, query: &str) -> Self {
        if UPSTREAM_TIMEOUT_MESSAGES.contains(&info) {
            Self::TransportTimeout {
                query: query.to_string(),
            }
        } else {
            Self::Upstream {
                message: info.to_string(),
            }
        }
    }

    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportTimeout { .. } | Self::Network(_))
    }

    /// Whether this error means the page simply doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound { .. })
    }

    /// Whether this error reports a capability the server lacks.
    ///
    /// Preloading swallows these and leaves the field empty.
    pub fn is_unsupported_feature(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedApiVersion { .. } | Self::MissingExtension { .. }
        )
    }
}

impl From<ValidationError> for WikiError {
    fn from(err: ValidationError) -> Self {
        WikiError::InvalidArgument {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for WikiError {
    fn from(err: serde_json::Error) -> Self {
        WikiError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = WikiError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_messages_become_transport_timeouts() {
        let err = WikiError::from_upstream_info("Pool queue is full", "Rust");
        assert!(matches!(err, WikiError::TransportTimeout { ref query } if query == "Rust"));
        assert!(err.is_retryable());

        let err = WikiError::from_upstream_info("HTTP request timed out.", "Rust");
        assert!(matches!(err, WikiError::TransportTimeout { .. }));
    }

    #[test]
    fn other_messages_become_upstream_errors() {
        let err = WikiError::from_upstream_info("Unrecognized parameter", "Rust");
        assert!(matches!(err, WikiError::Upstream { ref message } if message == "Unrecognized parameter"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn disambiguation_message_lists_options() {
        let err = WikiError::Disambiguation {
            title: "Mercury".to_string(),
            options: vec!["Mercury (planet)".to_string(), "Mercury (element)".to_string()],
            details: Vec::new(),
        };
        insta::assert_snapshot!(err.to_string(), @r###"
        "Mercury" may refer to:
          Mercury (planet)
          Mercury (element)
        "###);
    }

    #[test]
    fn version_error_names_both_versions() {
        let err = WikiError::UnsupportedApiVersion {
            operation: "redirects".to_string(),
            required: ApiVersion::new(1, 24),
            actual: ApiVersion::new(1, 20),
            api_url: "http://en.wikipedia.org/w/api.php".to_string(),
        };
        assert!(err.is_unsupported_feature());
        assert_eq!(
            err.to_string(),
            "Operation redirects requires API version 1.24+, but http://en.wikipedia.org/w/api.php runs 1.20"
        );
    }

    #[test]
    fn validation_errors_become_invalid_arguments() {
        let err: WikiError = ValidationError::EmptyField("query").into();
        assert!(matches!(err, WikiError::InvalidArgument { .. }));
    }
}
