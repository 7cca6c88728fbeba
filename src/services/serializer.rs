// src/services/serializer.rs

//! Parquet serialization of a [`TabularFrame`].

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::{AppError, Result};
use crate::models::TabularFrame;

/// Encode the frame as a Parquet file held in memory.
///
/// Every column is a nullable Utf8 field; no row index is written.
pub fn to_parquet(frame: &TabularFrame) -> Result<Vec<u8>> {
    if frame.columns().is_empty() {
        return Err(AppError::validation("Cannot serialize a frame without columns"));
    }

    let schema = Arc::new(Schema::new(
        frame
            .columns()
            .iter()
            .map(|column| Field::new(&column.name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let arrays: Vec<ArrayRef> = frame
        .columns()
        .iter()
        .map(|column| {
            let array: StringArray = column.values.iter().map(Option::as_deref).collect();
            Arc::new(array) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(buffer)
}

/// Column names and row count of a Parquet file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParquetSummary {
    pub columns: Vec<String>,
    pub rows: i64,
}

/// Read back the schema and row count of a Parquet file.
pub fn inspect_parquet(path: impl AsRef<Path>) -> Result<ParquetSummary> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    Ok(ParquetSummary {
        columns: builder
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect(),
        rows: builder.metadata().file_metadata().num_rows(),
    })
}
