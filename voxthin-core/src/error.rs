//! Error types for voxthin

use thiserror::Error;

/// Main error type for voxthin operations
///
/// Precondition violations (dimension mismatches, out-of-range access) are
/// programming errors and panic instead of surfacing here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Result type alias for voxthin operations
pub type Result<T> = std::result::Result<T, Error>;
