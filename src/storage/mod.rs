//! Storage backends for the serialized table.
//!
//! Uploads never fail with an error: they report an [`UploadOutcome`] so the
//! caller can tell a stored file from a skipped one.
//!
//! - `LocalStorage`: writes under a directory, for development runs
//! - `S3Storage`: puts the object into a bucket (feature `s3`)

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

// Re-export for convenience
pub use local::LocalStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

/// Content type of the uploaded object.
pub const PARQUET_CONTENT_TYPE: &str = "application/vnd.apache.parquet";

/// What happened to an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// The object was stored
    Uploaded { location: String, checksum: String },
    /// Nothing was sent: credentials are absent or incomplete
    CredentialsMissing { reason: String },
    /// The transfer was attempted and failed
    TransferError { reason: String },
}

impl UploadOutcome {
    /// Classify an error raised before or during an upload.
    pub fn from_error(error: AppError) -> Self {
        match error {
            AppError::CredentialsMissing(reason) => Self::CredentialsMissing { reason },
            other => Self::TransferError {
                reason: other.to_string(),
            },
        }
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }

    /// Location of the stored object, or the failure as an error.
    pub fn into_result(self) -> Result<String> {
        match self {
            Self::Uploaded { location, .. } => Ok(location),
            Self::CredentialsMissing { reason } => Err(AppError::CredentialsMissing(reason)),
            Self::TransferError { reason } => Err(AppError::Upload(reason)),
        }
    }

    /// Log the outcome at a level matching its severity.
    pub fn log(&self) {
        match self {
            Self::Uploaded { .. } => log::info!("{}", self),
            Self::CredentialsMissing { .. } | Self::TransferError { .. } => {
                log::error!("{}", self)
            }
        }
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uploaded { location, checksum } => {
                write!(f, "Uploaded {} (sha256 {})", location, checksum)
            }
            Self::CredentialsMissing { reason } => write!(f, "Credentials not available: {}", reason),
            Self::TransferError { reason } => write!(f, "Upload failed: {}", reason),
        }
    }
}

/// Trait for object storage backends.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `body` under `key`.
    async fn upload(&self, key: &str, body: Vec<u8>) -> UploadOutcome;

    /// Human-readable destination, for logs.
    fn describe(&self) -> String;
}

/// Hex-encoded SHA-256 of an object body.
pub fn checksum(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}
