// src/lambda/mod.rs

//! AWS Lambda handler for the crawler.
//!
//! Each invocation:
//! 1. Builds the configuration from defaults and the environment
//! 2. Scrapes the live table in headless Chrome
//! 3. Encodes it as Parquet and uploads it to the configured bucket

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{self, RunReport};
use crate::storage::UploadOutcome;

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeRequest {
    /// Value to pick in the filter `<select>` (overrides configuration)
    pub selection_filter: Option<String>,

    /// Object key to upload to (overrides configuration)
    pub key: Option<String>,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct ScrapeResponse {
    /// Whether the table was scraped and stored
    pub success: bool,

    /// Number of records scraped
    pub rows: usize,

    /// Number of pages visited
    pub pages: usize,

    /// Upload outcome, when the run got that far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadOutcome>,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl ScrapeResponse {
    fn from_report(report: RunReport) -> Self {
        let error = match &report.upload {
            UploadOutcome::Uploaded { .. } => None,
            other => Some(other.to_string()),
        };
        Self {
            success: error.is_none(),
            rows: report.rows,
            pages: report.pages,
            upload: Some(report.upload),
            error,
            execution_time_ms: 0,
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<ScrapeRequest>,
) -> std::result::Result<ScrapeResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!(
        "Starting scrape: selection_filter={:?}, key={:?}",
        request.selection_filter, request.key
    );

    let mut response = match run_scrape(request).await {
        Ok(report) => ScrapeResponse::from_report(report),
        Err(e) => {
            error!("Scrape failed: {}", e);
            ScrapeResponse {
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    };
    response.execution_time_ms = start.elapsed().as_millis() as u64;

    info!(
        "Scrape finished: success={}, {} rows from {} pages in {}ms",
        response.success, response.rows, response.pages, response.execution_time_ms
    );
    Ok(response)
}

/// Configuration for one invocation: environment first, then the payload.
fn invocation_config(request: &ScrapeRequest) -> Result<Config> {
    invocation_config_from(request, |name| std::env::var(name).ok())
}

fn invocation_config_from(
    request: &ScrapeRequest,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let mut config = Config::default();
    config.apply_overrides_from(lookup);

    if let Some(filter) = &request.selection_filter {
        config.scraper.selection_filter = filter.clone();
    }
    if let Some(key) = &request.key {
        config.storage.key = key.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Internal scrape logic.
async fn run_scrape(request: ScrapeRequest) -> Result<RunReport> {
    let config = invocation_config(&request)?;
    let key = config.storage.key.clone();
    let storage = config.storage.clone();

    pipeline::run_to_s3(move || pipeline::scrape_live(&config), &storage, &key).await
}
