// src/pipeline/run.rs

//! Full scrape → encode → upload run.

use std::time::Instant;

use serde::Serialize;

use crate::error::Result;
use crate::models::FullTable;
#[cfg(feature = "s3")]
use crate::models::StorageConfig;
#[cfg(feature = "s3")]
use crate::storage::S3Storage;
use crate::storage::{ObjectStorage, UploadOutcome};
use crate::utils::{human_bytes, log};

use super::export::encode_table;

const TOTAL_STEPS: usize = 3;
const RUN_TITLE: &str = "B3 Index Composition Crawler";

/// A scraped table, already encoded as Parquet.
#[derive(Debug, Clone)]
pub struct EncodedTable {
    pub pages: usize,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

/// What a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub pages: usize,
    pub rows: usize,
    pub bytes: usize,
    pub upload: UploadOutcome,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.upload.is_uploaded()
    }
}

/// Run the blocking `scrape` on a blocking thread and encode its result.
pub async fn collect_and_encode<F>(scrape: F) -> Result<EncodedTable>
where
    F: FnOnce() -> Result<FullTable> + Send + 'static,
{
    log::step(1, TOTAL_STEPS, "Scraping composition table");
    let table = tokio::task::spawn_blocking(scrape).await??;
    log::sub_item(&format!(
        "{} records from {} page(s)",
        table.len(),
        table.page_count
    ));

    log::step(2, TOTAL_STEPS, "Encoding Parquet");
    let bytes = encode_table(&table)?;

    Ok(EncodedTable {
        pages: table.page_count,
        rows: table.len(),
        bytes,
    })
}

/// Upload an encoded buffer and log the outcome.
pub async fn upload_buffer(
    storage: &dyn ObjectStorage,
    key: &str,
    bytes: Vec<u8>,
) -> UploadOutcome {
    log::step(
        3,
        TOTAL_STEPS,
        &format!("Uploading {} to {}", human_bytes(bytes.len()), storage.describe()),
    );
    let outcome = storage.upload(key, bytes).await;
    outcome.log();
    outcome
}

/// Scrape, encode and upload in one go.
///
/// Scrape and encoding failures are errors; the upload result is carried in
/// the report.
pub async fn run_pipeline<F>(scrape: F, storage: &dyn ObjectStorage, key: &str) -> Result<RunReport>
where
    F: FnOnce() -> Result<FullTable> + Send + 'static,
{
    let started = Instant::now();
    log::header(RUN_TITLE);

    let encoded = collect_and_encode(scrape).await?;
    let size = encoded.bytes.len();
    let upload = upload_buffer(storage, key, encoded.bytes).await;

    Ok(finish(encoded.pages, encoded.rows, size, upload, started))
}

/// Like [`run_pipeline`], with the S3 bucket from `config` as destination.
///
/// Missing credentials do not stop the scrape: they surface as a
/// `CredentialsMissing` outcome once the buffer is ready.
#[cfg(feature = "s3")]
pub async fn run_to_s3<F>(scrape: F, config: &StorageConfig, key: &str) -> Result<RunReport>
where
    F: FnOnce() -> Result<FullTable> + Send + 'static,
{
    config.require_bucket()?;
    let started = Instant::now();
    log::header(RUN_TITLE);

    let encoded = collect_and_encode(scrape).await?;
    let size = encoded.bytes.len();
    let upload = match S3Storage::from_env(config).await {
        Ok(storage) => upload_buffer(&storage, key, encoded.bytes).await,
        Err(e) => {
            let outcome = UploadOutcome::from_error(e);
            outcome.log();
            outcome
        }
    };

    Ok(finish(encoded.pages, encoded.rows, size, upload, started))
}

fn finish(pages: usize, rows: usize, bytes: usize, upload: UploadOutcome, started: Instant) -> RunReport {
    let report = RunReport {
        pages,
        rows,
        bytes,
        upload,
    };
    log_summary(&report, started);
    report
}

/// Log the closing summary of a run.
pub fn log_summary(report: &RunReport, started: Instant) {
    log::summary(
        "Run complete",
        &[
            ("Pages", report.pages.to_string()),
            ("Records", report.rows.to_string()),
            ("Parquet size", human_bytes(report.bytes)),
            ("Upload", report.upload.to_string()),
            ("Elapsed", format!("{:.1}s", started.elapsed().as_secs_f64())),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::RowRecord;
    use crate::storage::LocalStorage;

    fn table() -> FullTable {
        let mut row = RowRecord::new();
        row.insert("Código", "ITSA4");
        row.insert("Date", "2026-10-16");
        FullTable {
            rows: vec![row.clone(), row],
            page_count: 2,
        }
    }

    #[tokio::test]
    async fn test_run_pipeline_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let report = run_pipeline(|| Ok(table()), &storage, "b3.parquet")
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.pages, 2);
        assert_eq!(report.rows, 2);
        assert_eq!(
            report.bytes as u64,
            std::fs::metadata(dir.path().join("b3.parquet")).unwrap().len()
        );
    }

    #[tokio::test]
    async fn test_scrape_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = run_pipeline(
            || Err(AppError::structure_not_found("table", "timed out")),
            &storage,
            "b3.parquet",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::StructureNotFound { .. }));
        assert!(!dir.path().join("b3.parquet").exists());
    }

    #[tokio::test]
    async fn test_failed_upload_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let report = run_pipeline(|| Ok(table()), &storage, "../escape.parquet")
            .await
            .unwrap();

        assert!(!report.is_success());
        assert!(matches!(report.upload, UploadOutcome::TransferError { .. }));
    }
}
