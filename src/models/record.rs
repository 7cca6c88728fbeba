//! Scraped table rows.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// Column injected into every record with the extraction date.
pub const DATE_COLUMN: &str = "Date";

/// One scraped row: column name to cell text, in insertion order.
///
/// Inserting a key that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRecord {
    fields: Vec<(String, String)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RowRecord::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Every record scraped across all pages, in page order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FullTable {
    pub rows: Vec<RowRecord>,
    /// Number of pages the aggregator read
    pub page_count: usize,
}

impl FullTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = RowRecord::new();
        record.insert("Código", "PETR4");
        record.insert("Date", "2026-01-01");
        record.insert("Código", "VALE3");

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("Código"), Some("VALE3"));
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["Código", "Date"]);
    }

    #[test]
    fn test_serialize_keeps_order() {
        let record: RowRecord = [("Setor", "Financeiro"), ("Ação", "ITAU")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Setor":"Financeiro","Ação":"ITAU"}"#);
    }
}
