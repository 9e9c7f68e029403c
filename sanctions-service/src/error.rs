use crate::types::SanctionsSource;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ComplianceError {
    #[error("Sanctions feed {feed} unavailable: {reason}")]
    FeedUnavailable {
        feed: SanctionsSource,
        reason: String,
    },

    #[error("Failed to parse {feed} sanctions list: {reason}")]
    Parse {
        feed: SanctionsSource,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ComplianceError {
    pub(crate) fn parse(feed: SanctionsSource, reason: impl ToString) -> Self {
        ComplianceError::Parse {
            feed,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ComplianceError>;
