//! Pipeline entry points.
//!
//! - `WindowPlanner`: split a day into tumbling windows
//! - `run_extraction`: fetch and accumulate every window of a day
//! - `run_pipeline`: extraction, staging and publishing in one go
//! - `run_publish_staged`: publish a staged day again

pub mod extract;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod window;

pub use extract::{Extraction, run_extraction};
pub use pipeline::{RunReport, run_pipeline, run_publish_staged};
pub use window::{WindowPlanner, Windows, parse_target_date};
