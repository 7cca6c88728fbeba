// src/services/reader.rs

//! Page data reader.
//!
//! Reads the composition table on the current page. The table header spans
//! two rows: the last visual header groups two sub-columns, so the last
//! three raw header cells are collapsed into two composite names
//! (`"{parent} - {sub}"`). The final row of each page is a totals footer
//! with its own layout.

use chrono::{Local, NaiveDate};

use crate::browser::PageSession;
use crate::error::{AppError, Result};
use crate::models::{DATE_COLUMN, RowRecord, SelectorConfig};

/// Reads the rows of the table currently displayed in a session.
#[derive(Debug, Clone)]
pub struct TableReader {
    table: String,
    header_cell: String,
    row: String,
    cell: String,
    clock: fn() -> NaiveDate,
}

impl TableReader {
    pub fn new(selectors: &SelectorConfig) -> Self {
        Self {
            table: selectors.table.clone(),
            header_cell: selectors.header_cell.clone(),
            row: selectors.row.clone(),
            cell: selectors.cell.clone(),
            clock: today,
        }
    }

    /// Replace the date source stamped into every record.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// Read every data row plus the footer row of the current page.
    pub fn read_page<S: PageSession>(&self, session: &S) -> Result<Vec<RowRecord>> {
        let date = (self.clock)().format("%Y-%m-%d").to_string();
        let table = session.find_first(&self.table)?;

        let raw_headers = session
            .find_within(&table, &self.header_cell)?
            .iter()
            .map(|cell| session.text(cell))
            .collect::<Result<Vec<_>>>()?;
        let headers = reconcile_headers(raw_headers);

        let rows = session.find_within(&table, &self.row)?;
        let Some((footer, rest)) = rows.split_last() else {
            log::debug!("Table has no rows");
            return Ok(Vec::new());
        };
        let body = rest.get(1..).unwrap_or_default();

        let mut records = Vec::with_capacity(body.len() + 1);
        for row in body {
            let cells = self.cell_texts(session, row)?;
            if cells.is_empty() {
                continue;
            }
            let mut record = pair_cells(&headers, cells)?;
            record.insert(DATE_COLUMN, date.as_str());
            records.push(record);
        }

        let footer_cells = self.cell_texts(session, footer)?;
        match build_footer(&headers, &footer_cells, &date)? {
            Some(record) => records.push(record),
            None => log::debug!("Last row has no cells; no footer record"),
        }

        log::debug!(
            "Read {} records with {} headers",
            records.len(),
            headers.len()
        );
        Ok(records)
    }

    fn cell_texts<'a, S: PageSession>(
        &self,
        session: &'a S,
        row: &S::Element<'a>,
    ) -> Result<Vec<String>> {
        session
            .find_within(row, &self.cell)?
            .iter()
            .map(|cell| session.text(cell))
            .collect()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Collapse the grouped trailing header into composite column names.
///
/// With `n >= 3` raw headers, `raw[n-3]` is the parent of the last two and
/// the result has `n - 1` entries with no "Date" header; the date is added
/// to each record instead. Fewer than three raw headers are kept as-is,
/// followed by "Date".
pub fn reconcile_headers(raw: Vec<String>) -> Vec<String> {
    let n = raw.len();
    let mut headers = raw;
    if n < 3 {
        headers.push(DATE_COLUMN.to_string());
        return headers;
    }

    let grouped = headers.split_off(n - 3);
    if let [parent, first_sub, second_sub] = grouped.as_slice() {
        headers.push(composite(parent, first_sub));
        headers.push(composite(parent, second_sub));
    }
    headers
}

fn composite(parent: &str, sub: &str) -> String {
    format!("{parent} - {sub}")
}

/// Pair cells with headers by position.
///
/// Rows shorter than the header list fill the leading columns only.
pub fn pair_cells(headers: &[String], cells: Vec<String>) -> Result<RowRecord> {
    if cells.len() > headers.len() {
        return Err(AppError::index_mismatch(headers.len(), cells.len()));
    }
    Ok(headers.iter().cloned().zip(cells).collect())
}

/// Build the totals record from the last row of a page.
///
/// Cell 0 maps to `headers[0]` and cell 1 to `headers[n-3]`, or to the
/// last header when there are only two. Only when the third cell has text
/// do cells 2 and 3 fill `headers[n-2]` and `headers[n-1]`. Returns `None`
/// for a row without cells.
pub fn build_footer(headers: &[String], cells: &[String], date: &str) -> Result<Option<RowRecord>> {
    if cells.is_empty() {
        return Ok(None);
    }

    let n = headers.len();
    if n < 2 || cells.len() < 2 {
        return Err(AppError::index_mismatch(n, cells.len()));
    }
    let total_column = if n >= 3 { n - 3 } else { n - 1 };

    let mut record = RowRecord::new();
    record.insert(headers[0].as_str(), cells[0].as_str());
    record.insert(headers[total_column].as_str(), cells[1].as_str());

    let third = cells.get(2).map(String::as_str).unwrap_or_default();
    if !third.is_empty() {
        let fourth = cells
            .get(3)
            .ok_or_else(|| AppError::index_mismatch(n, cells.len()))?;
        record.insert(headers[n - 2].as_str(), third);
        record.insert(headers[n - 1].as_str(), fourth.as_str());
    }

    record.insert(DATE_COLUMN, date);
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::HtmlSession;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn fixed_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn reader() -> TableReader {
        TableReader::new(&SelectorConfig::default()).with_clock(fixed_date)
    }

    const SECTOR_PAGE: &str = r#"
        <table>
          <thead>
            <tr><th>Setor</th><th>Código</th><th>Ação</th><th>Tipo</th>
                <th>Qtde. Teórica</th><th colspan="2">Part. (%)</th></tr>
            <tr><th>Part. (%)</th><th>Part. (%)Acum.</th></tr>
          </thead>
          <tbody>
            <tr><td>Financeiro</td><td>ITUB4</td><td>ITAUUNIBANCO</td><td>PN N1</td>
                <td>4.801.593.832</td><td>8,123</td><td>21,510</td></tr>
            <tr><td>Petróleo</td><td>PETR4</td><td>PETROBRAS</td><td>PN N2</td>
                <td>4.566.445.852</td><td>7,002</td><td>15,321</td></tr>
          </tbody>
          <tfoot>
            <tr><td>Quantidade Teórica Total</td><td>97.425.561.340</td><td></td><td></td></tr>
          </tfoot>
        </table>
    "#;

    #[test]
    fn test_reconcile_worked_example() {
        let headers = reconcile_headers(strings(&["Código", "Qtde. Teórica", "Part.(%)"]));
        assert_eq!(
            headers,
            strings(&["Código - Qtde. Teórica", "Código - Part.(%)"])
        );
    }

    #[test]
    fn test_reconcile_shrinks_by_one_with_parent_prefix() {
        for n in 3..8 {
            let raw: Vec<String> = (0..n).map(|i| format!("h{i}")).collect();
            let headers = reconcile_headers(raw.clone());

            assert_eq!(headers.len(), n - 1);
            assert_eq!(headers[..n - 3], raw[..n - 3]);
            let parent = &raw[n - 3];
            assert_eq!(headers[n - 3], format!("{parent} - {}", raw[n - 2]));
            assert_eq!(headers[n - 2], format!("{parent} - {}", raw[n - 1]));
        }
    }

    #[test]
    fn test_reconcile_short_lists_only_gain_date() {
        assert_eq!(reconcile_headers(vec![]), strings(&["Date"]));
        assert_eq!(reconcile_headers(strings(&["Setor"])), strings(&["Setor", "Date"]));
        assert_eq!(
            reconcile_headers(strings(&["Setor", "Código"])),
            strings(&["Setor", "Código", "Date"])
        );
    }

    #[test]
    fn test_pair_cells_short_row() {
        let headers = strings(&["a", "b", "c"]);
        let record = pair_cells(&headers, strings(&["1", "2"])).unwrap();
        assert_eq!(record.iter().collect::<Vec<_>>(), vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_pair_cells_rejects_extra_cells() {
        let headers = strings(&["a"]);
        let err = pair_cells(&headers, strings(&["1", "2"])).unwrap_err();
        assert!(matches!(err, AppError::IndexMismatch { headers: 1, cells: 2 }));
    }

    #[test]
    fn test_footer_with_empty_third_cell() {
        let headers = strings(&["h0", "h1", "h2", "h3"]);
        let footer = build_footer(&headers, &strings(&["Total", "100", ""]), "2026-10-16")
            .unwrap()
            .unwrap();

        assert_eq!(
            footer.iter().collect::<Vec<_>>(),
            vec![("h0", "Total"), ("h1", "100"), ("Date", "2026-10-16")]
        );
        assert!(!footer.contains_key("h2"));
        assert!(!footer.contains_key("h3"));
    }

    #[test]
    fn test_footer_with_third_cell_fills_composites() {
        let headers = strings(&["h0", "h1", "h2", "h3"]);
        let footer = build_footer(
            &headers,
            &strings(&["Redutor", "1", "2", "3"]),
            "2026-10-16",
        )
        .unwrap()
        .unwrap();

        assert_eq!(footer.get("h0"), Some("Redutor"));
        assert_eq!(footer.get("h1"), Some("1"));
        assert_eq!(footer.get("h2"), Some("2"));
        assert_eq!(footer.get("h3"), Some("3"));
        assert_eq!(footer.get("Date"), Some("2026-10-16"));
    }

    #[test]
    fn test_footer_missing_third_cell_counts_as_empty() {
        let headers = strings(&["h0", "h1", "h2", "h3"]);
        let footer = build_footer(&headers, &strings(&["Total", "9"]), "2026-10-16")
            .unwrap()
            .unwrap();
        assert_eq!(footer.len(), 3);
    }

    #[test]
    fn test_footer_with_single_raw_header() {
        // one raw header plus "Date"
        let headers = reconcile_headers(strings(&["Código"]));
        let footer = build_footer(&headers, &strings(&["Total", "82"]), "2026-10-16")
            .unwrap()
            .unwrap();

        assert_eq!(footer.get("Código"), Some("Total"));
        assert_eq!(footer.get("Date"), Some("2026-10-16"));
        assert_eq!(footer.len(), 2);

        let two = strings(&["h0", "h1"]);
        let footer = build_footer(&two, &strings(&["a", "b", "c", "d"]), "d")
            .unwrap()
            .unwrap();
        assert_eq!(footer.get("h0"), Some("c"));
        assert_eq!(footer.get("h1"), Some("d"));
    }

    #[test]
    fn test_footer_bounds_checked() {
        let single = strings(&["Date"]);
        assert!(build_footer(&single, &strings(&["a", "b"]), "d").is_err());

        let headers = strings(&["h0", "h1", "h2", "h3"]);
        assert!(build_footer(&headers, &strings(&["a"]), "d").is_err());
        assert!(build_footer(&headers, &strings(&["a", "b", "c"]), "d").is_err());
        assert!(build_footer(&headers, &[], "d").unwrap().is_none());
    }

    #[test]
    fn test_read_page() {
        let session = HtmlSession::from_pages(&[SECTOR_PAGE]).unwrap();
        let records = reader().read_page(&session).unwrap();

        // two data rows plus the footer
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(
            first.columns().collect::<Vec<_>>(),
            vec![
                "Setor",
                "Código",
                "Ação",
                "Tipo",
                "Qtde. Teórica",
                "Part. (%) - Part. (%)",
                "Part. (%) - Part. (%)Acum.",
                "Date",
            ]
        );
        assert_eq!(first.get("Código"), Some("ITUB4"));
        assert_eq!(first.get("Part. (%) - Part. (%)Acum."), Some("21,510"));
        assert_eq!(first.get("Date"), Some("2026-10-16"));

        let footer = &records[2];
        assert_eq!(footer.get("Setor"), Some("Quantidade Teórica Total"));
        assert_eq!(footer.get("Qtde. Teórica"), Some("97.425.561.340"));
        assert!(!footer.contains_key("Part. (%) - Part. (%)"));
        assert_eq!(footer.get("Date"), Some("2026-10-16"));
    }

    #[test]
    fn test_read_page_skips_rows_without_cells() {
        let page = r#"
            <table>
              <tr><th>a</th><th>b</th><th>c</th><th>d</th><th>e</th></tr>
              <tr></tr>
              <tr><td>1</td><td>2</td><td>3</td></tr>
              <tr><td>T</td><td>9</td><td></td></tr>
            </table>
        "#;
        let session = HtmlSession::from_pages(&[page]).unwrap();
        let records = reader().read_page(&session).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("a"), Some("1"));
        assert_eq!(records[0].get("b"), Some("2"));
        assert_eq!(records[0].get("c - d"), Some("3"));
        assert!(!records[0].contains_key("c - e"));
        assert_eq!(records[1].get("a"), Some("T"));
        assert_eq!(records[1].get("b"), Some("9"));
    }

    #[test]
    fn test_read_page_without_table_fails() {
        let session = HtmlSession::from_pages(&["<p>Carregando...</p>"]).unwrap();
        let err = reader().read_page(&session).unwrap_err();
        assert!(matches!(err, AppError::StructureNotFound { .. }));
    }

    #[test]
    fn test_default_clock_stamps_today() {
        let session = HtmlSession::from_pages(&[SECTOR_PAGE]).unwrap();
        let before = Local::now().date_naive();
        let records = TableReader::new(&SelectorConfig::default())
            .read_page(&session)
            .unwrap();
        let after = Local::now().date_naive();

        let stamped = NaiveDate::parse_from_str(records[0].get("Date").unwrap(), "%Y-%m-%d")
            .unwrap();
        assert!(stamped == before || stamped == after);
    }
}
