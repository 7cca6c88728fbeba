// src/pipeline/scrape.rs

//! Page preparation and table collection.
//!
//! Everything here is blocking; async callers go through [`super::run`],
//! which moves the scrape onto a blocking thread.

use std::path::Path;

use crate::browser::{HtmlSession, PageSession};
use crate::error::Result;
use crate::models::{Config, FullTable};
use crate::services::TableAggregator;

/// Apply the selection filter and wait for the table to render.
pub fn prepare_page<S: PageSession>(session: &S, config: &Config) -> Result<()> {
    let timeout = config.scraper.page_ready_timeout();
    let selectors = &config.selectors;

    session.wait_for(&selectors.filter, timeout)?;
    session.select_value(&selectors.filter, &config.scraper.selection_filter)?;
    log::debug!(
        "Selected {}={}",
        selectors.filter,
        config.scraper.selection_filter
    );
    session.wait_for(&selectors.table, timeout)
}

/// Prepare the page, then read every page of the table.
pub fn scrape<S: PageSession>(session: &S, config: &Config) -> Result<FullTable> {
    prepare_page(session, config)?;
    TableAggregator::from_config(config).collect(session)
}

/// Scrape a sequence of saved HTML pages, in pagination order.
pub fn scrape_snapshots<P: AsRef<Path>>(config: &Config, paths: &[P]) -> Result<FullTable> {
    log::info!("Replaying {} snapshot(s)", paths.len());
    let session = HtmlSession::from_files(paths)?;
    scrape(&session, config)
}

/// Scrape the live page in a headless Chrome tab.
#[cfg(feature = "chrome")]
pub fn scrape_live(config: &Config) -> Result<FullTable> {
    use crate::browser::ChromeSession;

    let session = ChromeSession::launch(
        &config.browser,
        &config.scraper.source_url,
        config.scraper.page_ready_timeout(),
    )?;
    scrape(&session, config)
}
