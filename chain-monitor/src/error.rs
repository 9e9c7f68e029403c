//! Error types for the chain monitor

use thiserror::Error;

/// Chain monitor error
#[derive(Debug, Error)]
pub enum Error {
    /// Explorer call could not complete (connection, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Explorer answered with something we cannot use (bad status, rate limit, malformed body)
    #[error("Provider error from {provider}: {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// What went wrong
        message: String,
    },

    /// Caller passed a chain name we do not know
    #[error("Unsupported blockchain: {0}")]
    UnsupportedBlockchain(String),

    /// Empty or blank address
    #[error("Invalid address: '{0}'")]
    InvalidAddress(String),

    /// Known chain, but no registered data source serves it
    #[error("No data source registered for {0}")]
    NoDataSource(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Transport and provider failures may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Provider { .. })
    }

    pub(crate) fn provider(provider: &str, message: impl Into<String>) -> Self {
        Error::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Split reqwest failures into transport vs provider errors.
    pub(crate) fn from_http(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            Error::Transport(format!("{}: {}", provider, err))
        } else {
            Error::provider(provider, err.to_string())
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
