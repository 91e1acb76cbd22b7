//! Error types for ordkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using OrdKvError
pub type Result<T> = std::result::Result<T, OrdKvError>;

/// Unified error type for ordkv operations
#[derive(Debug, Error)]
pub enum OrdKvError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    NotFound,

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cursor is exhausted, the scan has no more results")]
    ExhaustedCursor,

    // -------------------------------------------------------------------------
    // Payload Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OrdKvError {
    /// Shorthand for building an `InvalidArgument`
    pub fn invalid(message: impl Into<String>) -> Self {
        OrdKvError::InvalidArgument(message.into())
    }

    /// True for a point lookup that hit an absent key
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrdKvError::NotFound)
    }

    /// True when the underlying engine failed (I/O, log corruption, encoding)
    pub fn is_engine_failure(&self) -> bool {
        matches!(
            self,
            OrdKvError::Io(_) | OrdKvError::WalCorruption(_) | OrdKvError::Serialization(_)
        )
    }
}
