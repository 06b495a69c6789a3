//! Error types shared by every stage of the automaton pipeline.

use thiserror::Error;

/// Common result type for the crate
pub type Result<T> = std::result::Result<T, EcaError>;

/// Unified error type
#[derive(Debug, Error)]
pub enum EcaError {
    /// Missing or out-of-range configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Initial automaton state outside the lattice or counter range
    #[error("Invalid initial state: {0}")]
    InvalidInitialState(String),

    /// Sweep aborted through its cancellation token
    #[error("Sweep cancelled")]
    Cancelled,

    /// Writer failure during LUT export
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration
    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl EcaError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        EcaError::InvalidConfig(msg.into())
    }
}
