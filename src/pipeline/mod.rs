//! Pipeline entry points for crawler operations.
//!
//! - `scrape`: prepare the page and collect every page of the table
//! - `export`: normalize and encode the table as Parquet
//! - `run`: scrape on a blocking thread, encode, then upload

pub mod export;
mod run;
pub mod scrape;

pub use export::{encode_table, export_to_file};
#[cfg(feature = "s3")]
pub use run::run_to_s3;
pub use run::{
    EncodedTable, RunReport, collect_and_encode, log_summary, run_pipeline, upload_buffer,
};
#[cfg(feature = "chrome")]
pub use scrape::scrape_live;
pub use scrape::{prepare_page, scrape, scrape_snapshots};
