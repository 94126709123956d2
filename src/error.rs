//! Error types for ytdl-bridge
//!
//! This module provides error handling for the library, split along the
//! taxonomy the launch engine actually needs:
//! - Configuration errors: detected before any child process exists, never
//!   retried (over-long executable path, missing terminal emulator, malformed
//!   request fields)
//! - Launch errors: resource failures while spawning or supervising a child,
//!   carrying the underlying OS error
//! - Machine-readable error codes for the message-dispatch layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ytdl-bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ytdl-bridge
///
/// Each variant includes contextual information to help diagnose issues.
/// No variant is fatal to the host process: a failed launch leaves the
/// launcher reusable for the next request.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    ///
    /// Reported before any process is spawned and never retried.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_exe_path_len")
        key: Option<String>,
    },

    /// Malformed download request (missing URL, bad index expression, etc.)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Spawn or supervision failure for a child process
    #[error("launch error: {0}")]
    Launch(#[from] LaunchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while spawning or supervising a child process
///
/// These are resource errors in the launch engine's sense: reported with the
/// underlying system error attached and never retried automatically; the
/// caller may retry the whole launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Spawning the child failed (binary not found, fork failure, pipe
    /// allocation failure)
    #[error("failed to spawn {executable}: {source}")]
    Spawn {
        /// The executable that could not be started
        executable: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The spawned child came back without one of its redirected standard
    /// streams, meaning the pipe pair was only partially wired
    #[error("child process is missing its {stream} pipe")]
    MissingPipe {
        /// Which standard stream was not wired ("stdin" or "stdout")
        stream: &'static str,
    },

    /// Waiting for child termination failed
    #[error("failed to wait for child process: {0}")]
    Wait(#[source] std::io::Error),
}

impl Error {
    /// Create a configuration error without an associated key
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            key: None,
        }
    }

    /// Create a configuration error tied to a specific configuration key
    pub fn config_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Get the machine-readable error code for this error
    ///
    /// The message-dispatch layer forwards these to the front end, which
    /// matches on them instead of parsing display strings.
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Launch(e) => match e {
                LaunchError::Spawn { .. } => "spawn_failed",
                LaunchError::MissingPipe { .. } => "pipe_failed",
                LaunchError::Wait(_) => "wait_failed",
            },
            Error::Io(_) => "io_error",
        }
    }
}
