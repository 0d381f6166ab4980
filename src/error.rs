//! Error types for background transparency operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for background transparency operations
pub type Result<T> = std::result::Result<T, BgClearError>;

/// Error types for background transparency operations
///
/// Every variant is terminal for the invocation that produced it: the
/// pipeline never writes an output image after a load or decode failure.
#[derive(Error, Debug)]
pub enum BgClearError {
    /// Input path does not exist
    #[error("Input not found: '{}'", .0.display())]
    InputNotFound(PathBuf),

    /// Input exists but is not a decodable raster image
    #[error("Failed to decode image '{}': {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    /// Output could not be encoded or written
    #[error("Failed to write image '{}': {message}", .path.display())]
    Write { path: PathBuf, message: String },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BgClearError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an input-not-found error for `path`
    pub fn input_not_found<P: AsRef<Path>>(path: P) -> Self {
        Self::InputNotFound(path.as_ref().to_path_buf())
    }

    /// Create a decode error with the offending path
    pub fn decode_error<P: AsRef<Path>, E: std::fmt::Display>(path: P, error: E) -> Self {
        Self::Decode {
            path: path.as_ref().to_path_buf(),
            message: error.to_string(),
        }
    }

    /// Create a write error with the target path
    pub fn write_error<P: AsRef<Path>, E: std::fmt::Display>(path: P, error: E) -> Self {
        Self::Write {
            path: path.as_ref().to_path_buf(),
            message: error.to_string(),
        }
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Pipeline stage that produced this error, for user-facing reports
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InputNotFound(_) | Self::Decode { .. } => "load",
            Self::Write { .. } => "save",
            Self::InvalidConfig(_) => "configuration",
        }
    }
}
