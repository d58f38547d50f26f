//! Error types for aptprobe operations.
//!
//! This module defines [`ProbeError`], the error type used throughout the
//! crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every probe failure is fatal; callers get no partial fragment
//! - Engine diagnostics are carried verbatim in `detail` fields
//! - Use `anyhow::Error` (via `ProbeError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for aptprobe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The container engine could not retrieve the image.
    #[error("Failed to pull image '{image}': {detail}")]
    PullFailed { image: String, detail: String },

    /// A probe failed without the "not installed" marker.
    #[error("Unexpected failure probing '{dependency}': {detail}")]
    UnexpectedFailure { dependency: String, detail: String },

    /// A probe exceeded its time bound.
    #[error("Probe for '{dependency}' timed out after {seconds}s")]
    Timeout { dependency: String, seconds: u64 },

    /// Image reference was empty.
    #[error("Invalid image reference: {message}")]
    InvalidImage { message: String },

    /// Dependency name cannot be passed safely to the query tool.
    #[error("Invalid dependency '{dependency}': {reason}")]
    InvalidDependency { dependency: String, reason: String },

    /// The engine binary could not be spawned.
    #[error("Container engine '{engine}' is unavailable: {message}")]
    EngineUnavailable { engine: String, message: String },

    /// Configuration file not found at an explicitly requested location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProbeError {
    /// Whether this error comes from user input or configuration rather
    /// than from probing the image.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            ProbeError::InvalidImage { .. }
                | ProbeError::InvalidDependency { .. }
                | ProbeError::ConfigNotFound { .. }
                | ProbeError::ConfigParseError { .. }
                | ProbeError::ConfigValidationError { .. }
        )
    }
}

/// Result type alias for aptprobe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
