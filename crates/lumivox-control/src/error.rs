//! Error types for the control system
use thiserror::Error;

/// Control system errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// DMX addressing or configuration error
    #[error("DMX error: {0}")]
    DmxError(String),

    /// Invalid Art-Net endpoint configuration
    #[error("Invalid Art-Net endpoint: {0}")]
    InvalidEndpoint(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
