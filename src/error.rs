//! Journal Errors - Failure Taxonomy Shared by All Layers
//!
//! Absence is never an error here: lookups return `Option` and
//! mutations of a missing trade report zero rows affected. Asset
//! deletion failures are logged by the asset store and never reach
//! this type.

use thiserror::Error;

use crate::domain::Timeframe;

/// Errors surfaced by journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Input rejected before anything was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Underlying storage engine failure (connection, constraint, I/O).
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    /// A screenshot payload could not be persisted.
    #[error("failed to persist {timeframe} screenshot: {source}")]
    Asset {
        timeframe: Timeframe,
        #[source]
        source: std::io::Error,
    },

    /// The screenshot map could not be serialized for storage.
    #[error("failed to encode screenshots column: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl JournalError {
    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, JournalError>;
