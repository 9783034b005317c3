//! # Error Types
//!
//! Custom error types for DSM Link using `thiserror`.
//!
//! Only initialization and transport failures surface as errors. Recoverable
//! decode conditions (undetected resolution, corrupt frames, failsafe) are
//! absorbed into the channel store's sentinel values and never reach the
//! flight core as control flow.

use thiserror::Error;

/// Main error type for DSM Link
#[derive(Debug, Error)]
pub enum DsmLinkError {
    /// Receiver initialization failed (fatal to board bring-up)
    #[error("Receiver init failed: {0}")]
    Init(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serial transport errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// No serial device could be opened
    #[error("Serial port not found, tried: {0}")]
    SerialPortNotFound(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DSM Link
pub type Result<T> = std::result::Result<T, DsmLinkError>;
