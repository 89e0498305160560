//! Error types for raw format classification

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for classification operations
pub type Result<T> = std::result::Result<T, ClassifyError>;

/// Main error type for rawcheckr
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The input could not be opened
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Read or seek failure on an open stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Byte swap requested for an element width the reader cannot handle
    #[error("Unsupported element width for byte swap: {0} bytes (1..=8 supported)")]
    UnsupportedWidth(usize),

    /// Window has zero or non-finite energy and cannot be normalized
    #[error("Degenerate signal: zero or non-finite RMS")]
    DegenerateSignal,

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WAV export failure
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

impl ClassifyError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ClassifyError::InvalidConfig(msg.into())
    }

    /// Whether the classifier can recover from this error by scoring the
    /// hypothesis as lowest instead of aborting
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ClassifyError::DegenerateSignal)
    }
}
