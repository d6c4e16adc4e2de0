// src/lib.rs

//! Wikipedia recent changes extractor.
//!
//! Pulls one UTC day of the recent changes feed in fixed-size windows,
//! accumulates the rows, and replaces a DuckDB table with the result.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
