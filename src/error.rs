//! Error types
//!
//! None of these are fatal: the orchestration layer logs them and stays in
//! its previous consistent state.

use thiserror::Error;

/// Scene switching failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// No scene is registered under this name
    #[error("scene \"{0}\" not found")]
    Unregistered(String),
}

/// Level sequencing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LevelError {
    /// Level number outside 1..=6
    #[error("invalid level number: {0}")]
    OutOfRange(u8),
}

/// An event handler could not process an event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

/// Storage backend failures
#[derive(Debug, Error)]
pub enum StorageError {
    /// No storage is available on this platform/context
    #[error("storage unavailable")]
    Unavailable,

    /// The backend rejected the write (quota, private browsing, ...)
    #[error("storage rejected write: {0}")]
    Rejected(String),

    /// Filesystem error (native backend)
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be encoded/decoded
    #[error("storage format error: {0}")]
    Format(#[from] serde_json::Error),
}
