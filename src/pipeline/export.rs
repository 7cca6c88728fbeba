// src/pipeline/export.rs

//! Normalization and Parquet encoding of a scraped table.

use std::path::Path;

use crate::error::Result;
use crate::models::FullTable;
use crate::services::{normalize_frame, to_parquet};
use crate::utils::human_bytes;

/// Normalize the table into a frame and encode it as Parquet.
pub fn encode_table(table: &FullTable) -> Result<Vec<u8>> {
    let frame = normalize_frame(table);
    log::debug!("Frame columns: {:?}", frame.column_names());

    let bytes = to_parquet(&frame)?;
    log::info!(
        "Encoded {} rows x {} columns ({})",
        frame.row_count(),
        frame.columns().len(),
        human_bytes(bytes.len())
    );
    Ok(bytes)
}

/// Encode the table and write it to `path`, creating parent directories.
pub fn export_to_file(table: &FullTable, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let bytes = encode_table(table)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;

    log::info!("Wrote {}", path.display());
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::RowRecord;
    use crate::services::inspect_parquet;

    fn table() -> FullTable {
        let mut row = RowRecord::new();
        row.insert("Código", "\u{feff}VALE3");
        row.insert("Date", "2026-10-16");
        FullTable {
            rows: vec![row],
            page_count: 1,
        }
    }

    #[test]
    fn test_export_writes_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/b3.parquet");

        let size = export_to_file(&table(), &path).unwrap();

        assert_eq!(size as u64, std::fs::metadata(&path).unwrap().len());
        let summary = inspect_parquet(&path).unwrap();
        assert_eq!(summary.columns, vec!["Código", "Date"]);
        assert_eq!(summary.rows, 1);
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let err = encode_table(&FullTable::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
