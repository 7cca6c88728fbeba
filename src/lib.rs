// src/lib.rs

//! B3 index composition crawler.
//!
//! Scrapes the paginated composition table, normalizes it into a frame,
//! encodes it as Parquet and uploads it to object storage.

pub mod browser;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
