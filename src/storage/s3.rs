//! AWS S3 storage implementation.
//!
//! Credentials come from `AWS_ACCESS_KEY` / `AWS_ACCESS_SECRET` (usually via
//! `.env`); bucket and region from [`StorageConfig`].

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::models::StorageConfig;
use crate::storage::{ObjectStorage, PARQUET_CONTENT_TYPE, UploadOutcome, checksum};

/// S3-based object storage.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Create S3 storage from configuration and environment credentials.
    pub async fn from_env(config: &StorageConfig) -> Result<Self> {
        Self::from_lookup(config, |name| std::env::var(name).ok()).await
    }

    /// Create S3 storage, reading credentials through `lookup`.
    pub async fn from_lookup(
        config: &StorageConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let bucket = config.require_bucket()?.to_string();
        let credentials = credentials_from(lookup)?;

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Ok(Self::new(Client::new(&sdk_config), bucket))
    }
}

/// Static credentials from the access key variables.
fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
    let read = |name: &str| {
        lookup(name)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::CredentialsMissing(format!("{name} is not set")))
    };
    let access_key = read("AWS_ACCESS_KEY")?;
    let secret = read("AWS_ACCESS_SECRET")?;

    Ok(Credentials::new(access_key, secret, None, None, "environment"))
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, key: &str, body: Vec<u8>) -> UploadOutcome {
        let digest = checksum(&body);
        let size = body.len();

        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(PARQUET_CONTENT_TYPE)
            .metadata("sha256", &digest)
            .send()
            .await;

        match result {
            Ok(_) => {
                log::debug!("Put {} bytes to s3://{}/{}", size, self.bucket, key);
                UploadOutcome::Uploaded {
                    location: format!("s3://{}/{}", self.bucket, key),
                    checksum: digest,
                }
            }
            Err(err) => UploadOutcome::from_error(AppError::s3(DisplayErrorContext(&err))),
        }
    }

    fn describe(&self) -> String {
        format!("s3://{}", self.bucket)
    }
}
