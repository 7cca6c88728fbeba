//! Rectangular, column-major view of a scraped table.

use serde::Serialize;

use super::record::RowRecord;

/// One named column; `None` marks a field the source row did not carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameColumn {
    pub name: String,
    pub values: Vec<Option<String>>,
}

/// Records coerced into named columns of equal length.
///
/// Columns appear in the order their names are first seen across rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TabularFrame {
    columns: Vec<FrameColumn>,
    row_count: usize,
}

impl TabularFrame {
    pub fn from_records(records: &[RowRecord]) -> Self {
        let mut columns: Vec<FrameColumn> = Vec::new();

        for name in records.iter().flat_map(RowRecord::columns) {
            if !columns.iter().any(|c| c.name == name) {
                columns.push(FrameColumn {
                    name: name.to_string(),
                    values: Vec::with_capacity(records.len()),
                });
            }
        }

        for record in records {
            for column in &mut columns {
                column
                    .values
                    .push(record.get(&column.name).map(str::to_string));
            }
        }

        Self {
            columns,
            row_count: records.len(),
        }
    }

    pub fn columns(&self) -> &[FrameColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&FrameColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Apply `f` to every present value; nulls are left untouched.
    pub fn map_values(self, f: impl Fn(&str) -> String) -> Self {
        let columns = self
            .columns
            .into_iter()
            .map(|column| FrameColumn {
                name: column.name,
                values: column
                    .values
                    .into_iter()
                    .map(|value| value.map(|v| f(&v)))
                    .collect(),
            })
            .collect();

        Self {
            columns,
            row_count: self.row_count,
        }
    }
}
