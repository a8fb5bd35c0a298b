//! Core error types for focusguard-core.
//!
//! Two families, handled differently (see the recorder and coordinator):
//! - ordering/programming errors ([`RecorderError`]) are surfaced to the
//!   caller and never swallowed
//! - I/O errors ([`StorageError`], [`ConfigError`]) are recovered locally
//!   by a retry-or-report policy; a failed save never loses the
//!   in-memory session

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error type for focusguard-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timeline recorder contract violations
    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),

    /// Session persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Contract violations reported by the timeline recorder.
///
/// These are caller mistakes (wrong lifecycle or out-of-order
/// timestamps), not recoverable I/O conditions, so they fail fast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecorderError {
    /// `start` was called while a session is already open
    #[error("A session is already running")]
    AlreadyRunning,

    /// `observe`/`finish` was called with no open session
    #[error("No active session")]
    NoActiveSession,

    /// A timestamp predates the start of the currently open interval
    #[error("Non-monotonic timestamp: {at} is before interval start {interval_start}")]
    NonMonotonicTimestamp {
        at: DateTime<Utc>,
        interval_start: DateTime<Utc>,
    },
}

/// Session persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The data directory could not be determined or created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a completed session failed
    #[error("Failed to save session to {path}: {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the session directory failed
    #[error("Failed to load sessions from {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored session document could not be parsed
    #[error("Failed to parse session file {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    /// Lookup by id found nothing
    #[error("No stored session with id {0}")]
    NotFound(uuid::Uuid),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn umbrella_wraps_each_family() {
        let recorder: CoreError = RecorderError::AlreadyRunning.into();
        assert!(recorder.to_string().contains("already running"));

        let storage: CoreError = StorageError::NotFound(uuid::Uuid::nil()).into();
        assert!(storage.to_string().contains("No stored session"));

        let config: CoreError = ConfigError::UnknownKey("nope".into()).into();
        assert!(config.to_string().contains("nope"));

        let custom = CoreError::Custom("line 3: bad record".into());
        assert_eq!(custom.to_string(), "line 3: bad record");
    }
}
