//! Error types for IFC parsing and validation.

use thiserror::Error;

/// Errors that can occur while preparing or running a validation.
///
/// None of these escape [`crate::validate`]: the orchestrator folds them into
/// a SYNTAX finding. They surface directly only from configuration loading,
/// [`crate::Validator::new`], and [`crate::Validator::parse`].
#[derive(Error, Debug)]
pub enum StepError {
    /// I/O error reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A configured pattern failed to compile.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        /// The offending pattern text.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },

    /// No `DATA;...ENDSEC;` region in the input.
    #[error("DATA section not found")]
    MissingDataSection,

    /// JSON rendering failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else that went wrong inside the pipeline.
    #[error("internal validation failure: {0}")]
    Internal(String),
}

impl StepError {
    /// Create a pattern compilation error.
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Result type for IFC operations.
pub type Result<T> = std::result::Result<T, StepError>;
