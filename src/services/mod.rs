//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Reading one page of the composition table (`TableReader`)
//! - Paging through the table (`Pager`)
//! - Collecting every page into one table (`TableAggregator`)
//! - Normalizing cell text (`normalizer`)
//! - Encoding the result as Parquet (`serializer`)

mod aggregator;
pub mod normalizer;
mod pager;
mod reader;
pub mod serializer;

pub use aggregator::TableAggregator;
pub use normalizer::{normalize_frame, normalize_text};
pub use pager::Pager;
pub use reader::{TableReader, build_footer, pair_cells, reconcile_headers};
pub use serializer::{ParquetSummary, inspect_parquet, to_parquet};
