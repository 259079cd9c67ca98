//! Error types for egg pool workflows

use pool_append::AppendFailure;
use pool_model::PoolError;
use std::path::PathBuf;

/// Configuration loading and setup failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::PoolConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered as TOML
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    /// Required setting left empty
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// Setting present but unusable
    #[error("invalid setting '{field}': {reason}")]
    Invalid {
        /// Setting name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A client could not be built from the settings
    #[error("failed to set up client: {0}")]
    Client(#[from] PoolError),
}

/// Why a submission did not land
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// Form rejected before any network call; message shown as-is
    #[error("{0}")]
    Invalid(String),

    /// Append gave up; shows the last underlying error verbatim
    #[error("Submission failed: {0}")]
    Failed(#[from] AppendFailure),
}

impl SubmissionError {
    /// Attempts made before giving up (0 when rejected up front)
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Invalid(_) => 0,
            Self::Failed(failure) => failure.attempts,
        }
    }
}
