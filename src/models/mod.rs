// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod frame;
mod record;

// Re-export all public types
pub use config::{BrowserConfig, Config, ScrapeConfig, SelectorConfig, StorageConfig};
pub use frame::{FrameColumn, TabularFrame};
pub use record::{DATE_COLUMN, FullTable, RowRecord};
