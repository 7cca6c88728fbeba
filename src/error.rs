// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// An expected table, header or pagination element was not rendered
    #[error("Element '{selector}' not found: {detail}")]
    StructureNotFound { selector: String, detail: String },

    /// A row carried more cells than there are headers to pair them with
    #[error("Index mismatch: {cells} cells for {headers} headers")]
    IndexMismatch { headers: usize, cells: usize },

    /// Text could not be decoded as UTF-8
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Browser automation failed
    #[error("Browser error: {0}")]
    Browser(String),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

    /// Storing the serialized table failed
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Object storage credentials are absent or incomplete
    #[error("Credentials not available: {0}")]
    CredentialsMissing(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Arrow batch construction failed
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet encoding failed
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The blocking scrape task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a missing-element error.
    pub fn structure_not_found(selector: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self::StructureNotFound {
            selector: selector.into(),
            detail: detail.to_string(),
        }
    }

    /// Create a header/cell count mismatch error.
    pub fn index_mismatch(headers: usize, cells: usize) -> Self {
        Self::IndexMismatch { headers, cells }
    }

    /// Create an encoding error.
    pub fn encoding(message: impl fmt::Display) -> Self {
        Self::Encoding(message.to_string())
    }

    /// Create a browser automation error.
    pub fn browser(message: impl fmt::Display) -> Self {
        Self::Browser(message.to_string())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create an S3 error.
    pub fn s3(message: impl fmt::Display) -> Self {
        Self::S3(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
