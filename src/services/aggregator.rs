//! Multi-page table aggregation.

use crate::browser::PageSession;
use crate::error::Result;
use crate::models::{Config, FullTable};

use super::{Pager, TableReader};

/// Reads every page of the table, in order, into one [`FullTable`].
#[derive(Debug, Clone)]
pub struct TableAggregator {
    reader: TableReader,
    pager: Pager,
}

impl TableAggregator {
    pub fn new(reader: TableReader, pager: Pager) -> Self {
        Self { reader, pager }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TableReader::new(&config.selectors),
            Pager::new(&config.selectors, &config.scraper),
        )
    }

    /// Read the current page, then keep paging until the pager reports the
    /// last page. Any structural failure aborts the whole table.
    pub fn collect<S: PageSession>(&self, session: &S) -> Result<FullTable> {
        let mut table = FullTable::default();

        loop {
            let records = self.reader.read_page(session)?;
            table.page_count += 1;
            log::info!(
                "Page {}: {} records",
                table.page_count,
                records.len()
            );
            table.rows.extend(records);

            if !self.pager.advance(session)? {
                break;
            }
        }

        Ok(table)
    }
}
