// src/error.rs

//! Unified error handling for the site build tooling.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for build operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Front matter parsing failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single input file could not be read or parsed
    #[error("Failed to load {path}: {message}")]
    Parse { path: String, message: String },

    /// A parsed record could not be normalized
    #[error("Failed to normalize record '{record}': {message}")]
    Normalize { record: String, message: String },

    /// An embed URL could not be resolved
    #[error("Resolution error for {url}: {message}")]
    Resolution { url: String, message: String },

    /// A queued task exceeded its time budget
    #[error("Task timed out after {after:?}")]
    Timeout { after: Duration },

    /// The queue dropped a task before it produced a result
    #[error("Request queue closed before the task completed")]
    QueueClosed,
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a per-file load error.
    pub fn parse(path: &Path, message: impl fmt::Display) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a per-record normalization error.
    pub fn normalize(record: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Normalize {
            record: record.into(),
            message: message.to_string(),
        }
    }

    /// Create an embed resolution error.
    pub fn resolution(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Resolution {
            url: url.into(),
            message: message.to_string(),
        }
    }
}
