//! Error types for the reference oracles

use thiserror::Error;

/// Oracle error type
#[derive(Error, Debug)]
pub enum Error {
    /// JSON parsing error (configuration payloads)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Contract violation: malformed inputs, mismatched lengths, missing variables
    #[error("Validation error: {0}")]
    Validation(String),

    /// Numerical failure: non-convergence, non-finite integrand, degenerate evidence
    #[error("Computation error: {0}")]
    Computation(String),

    /// Input shape whose semantics are not defined
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
