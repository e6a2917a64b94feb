//! Error types for Concierge.
//!
//! This module defines a unified error enum that covers document loading,
//! embedding, vector search, agent routing, configuration and serialization.

use thiserror::Error;

/// Unified error type for Concierge.
///
/// Every fallible operation returns `Result<T, AppError>`. An empty search
/// result is a success value and is never used in place of one of these.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors (document loading)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding provider failures
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Query or indexed vector has the wrong number of dimensions
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Caller passed an argument outside the accepted range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An agent with this name is already registered
    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(String),

    /// No agent with this name is registered
    #[error("Unknown agent: '{0}'")]
    UnknownAgent(String),

    /// Reply template errors
    #[error("Template error: {0}")]
    Template(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
