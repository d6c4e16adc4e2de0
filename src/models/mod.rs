// src/models/mod.rs

//! Domain models for the extraction pipeline.

mod config;
mod edit;
mod table;
mod window;

// Re-export all public types
pub use config::{ApiConfig, Config, LoggingConfig, MAX_API_LIMIT, StorageConfig};
pub use edit::{ChangeType, EditRecord};
pub use table::{EditHistoryTable, RecordBatch, RunStats};
pub use window::{API_TIMESTAMP_FORMAT, WindowSpec};
