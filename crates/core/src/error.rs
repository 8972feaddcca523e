//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid ID format: '{0}'. Must be positive integer")]
    InvalidId(String),

    #[error("CSV string is empty or null")]
    EmptyIdList,

    #[error("CSV string is too long: received {len} characters, maximum allowed is {max}")]
    IdListTooLong { len: usize, max: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
