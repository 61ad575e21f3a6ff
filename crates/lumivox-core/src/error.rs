//! Error types for the core analysis crate
use thiserror::Error;

/// Core analysis errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sample window too short for the requested analysis
    #[error("Insufficient samples: need {needed}, got {got}")]
    InsufficientSamples {
        /// Minimum number of samples required
        needed: usize,
        /// Number of samples provided
        got: usize,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
