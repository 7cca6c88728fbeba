//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target page and run parameters
    #[serde(default)]
    pub scraper: ScrapeConfig,

    /// CSS selectors for the composition table and its controls
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Headless browser launch settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Object storage destination
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from the process environment (after `.env` loading).
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Unparsable numeric values are ignored with a warning.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SOURCE_URL") {
            self.scraper.source_url = url;
        }
        if let Some(timeout) = lookup("PAGE_READY_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.scraper.page_ready_timeout_secs = secs,
                Err(_) => log::warn!("Ignoring invalid PAGE_READY_TIMEOUT_SECS: {}", timeout),
            }
        }
        if let Some(filter) = lookup("SELECTION_FILTER") {
            self.scraper.selection_filter = filter;
        }
        if let Some(bucket) = lookup("AWS_S3_BUCKET_NAME") {
            self.storage.bucket = bucket;
        }
        if let Some(region) = lookup("AWS_REGION_NAME") {
            self.storage.region = region;
        }
        if let Some(key) = lookup("OUTPUT_KEY") {
            self.storage.key = key;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.source_url.trim().is_empty() {
            return Err(AppError::validation("scraper.source_url is empty"));
        }
        url::Url::parse(&self.scraper.source_url).map_err(|e| {
            AppError::validation(format!("scraper.source_url is not a valid URL: {e}"))
        })?;
        if self.scraper.page_ready_timeout_secs == 0 {
            return Err(AppError::validation(
                "scraper.page_ready_timeout_secs must be > 0",
            ));
        }
        for (name, value) in self.selectors.entries() {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("selectors.{name} is empty")));
            }
        }
        if self.storage.key.trim().is_empty() {
            return Err(AppError::validation("storage.key is empty"));
        }
        Ok(())
    }
}

/// Target page and run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Page hosting the composition table
    #[serde(default = "defaults::source_url")]
    pub source_url: String,

    /// How long to wait for the table to render, in seconds
    #[serde(default = "defaults::page_ready_timeout")]
    pub page_ready_timeout_secs: u64,

    /// Option value chosen in the grouping dropdown ("2" = sector of activity)
    #[serde(default = "defaults::selection_filter")]
    pub selection_filter: String,
}

impl ScrapeConfig {
    pub fn page_ready_timeout(&self) -> Duration {
        Duration::from_secs(self.page_ready_timeout_secs)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            source_url: defaults::source_url(),
            page_ready_timeout_secs: defaults::page_ready_timeout(),
            selection_filter: defaults::selection_filter(),
        }
    }
}

/// CSS selectors for the composition table and its controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// The grouping `<select>` element
    #[serde(default = "defaults::filter")]
    pub filter: String,

    /// The data table
    #[serde(default = "defaults::table")]
    pub table: String,

    /// Header cells, searched within the table
    #[serde(default = "defaults::header_cell")]
    pub header_cell: String,

    /// Rows, searched within the table
    #[serde(default = "defaults::row")]
    pub row: String,

    /// Data cells, searched within a row
    #[serde(default = "defaults::cell")]
    pub cell: String,

    /// The "next page" control
    #[serde(default = "defaults::pagination_next")]
    pub pagination_next: String,

    /// Class token marking the "next page" control as disabled
    #[serde(default = "defaults::disabled_marker")]
    pub disabled_marker: String,
}

impl SelectorConfig {
    fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("filter", self.filter.as_str()),
            ("table", self.table.as_str()),
            ("header_cell", self.header_cell.as_str()),
            ("row", self.row.as_str()),
            ("cell", self.cell.as_str()),
            ("pagination_next", self.pagination_next.as_str()),
            ("disabled_marker", self.disabled_marker.as_str()),
        ]
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            filter: defaults::filter(),
            table: defaults::table(),
            header_cell: defaults::header_cell(),
            row: defaults::row(),
            cell: defaults::cell(),
            pagination_next: defaults::pagination_next(),
            disabled_marker: defaults::disabled_marker(),
        }
    }
}

/// Headless browser launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Extra command-line switches passed to Chrome
    #[serde(default = "defaults::browser_args")]
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: defaults::headless(),
            args: defaults::browser_args(),
        }
    }
}

/// Object storage destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket name; usually supplied through `AWS_S3_BUCKET_NAME`
    #[serde(default)]
    pub bucket: String,

    #[serde(default = "defaults::region")]
    pub region: String,

    /// Object key of the uploaded Parquet file
    #[serde(default = "defaults::key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: defaults::region(),
            key: defaults::key(),
        }
    }
}

impl StorageConfig {
    /// The configured bucket, or a configuration error when none is set.
    pub fn require_bucket(&self) -> Result<&str> {
        let bucket = self.bucket.trim();
        if bucket.is_empty() {
            return Err(AppError::config(
                "No bucket configured (storage.bucket or AWS_S3_BUCKET_NAME)",
            ));
        }
        Ok(bucket)
    }
}

mod defaults {
    pub fn source_url() -> String {
        "https://sistemaswebb3-listados.b3.com.br/indexPage/day/IBOV?language=pt-br".into()
    }
    pub fn page_ready_timeout() -> u64 {
        5
    }
    pub fn selection_filter() -> String {
        "2".into()
    }

    pub fn filter() -> String {
        "#segment".into()
    }
    pub fn table() -> String {
        "table".into()
    }
    pub fn header_cell() -> String {
        "th".into()
    }
    pub fn row() -> String {
        "tr".into()
    }
    pub fn cell() -> String {
        "td".into()
    }
    pub fn pagination_next() -> String {
        ".pagination-next".into()
    }
    pub fn disabled_marker() -> String {
        "disabled".into()
    }

    pub fn headless() -> bool {
        true
    }
    pub fn browser_args() -> Vec<String> {
        vec![
            "--disable-gpu".into(),
            "--no-sandbox".into(),
            "--disable-dev-shm-usage".into(),
        ]
    }

    pub fn region() -> String {
        "sa-east-1".into()
    }
    pub fn key() -> String {
        "b3.parquet".into()
    }
}
