//! Error types for the ctxpack domain.
//!
//! The packing pipeline itself is total and never fails; these errors only
//! surface at the registration edge and when serializing results.

use thiserror::Error;

/// The top-level error type for ctxpack operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid source '{name}': {reason}")]
    InvalidSource { name: String, reason: String },

    #[error("Invalid constraint {trigger} -> {dependency}: {reason}")]
    InvalidConstraint {
        trigger: String,
        dependency: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;
