//! Service layer for the extraction pipeline.
//!
//! - Change feed fetching (`ChangeFeedClient`, behind the `ChangeSource` trait)
//! - Batch accumulation (`EditHistoryAccumulator`)

mod accumulator;
mod changes;

pub use accumulator::EditHistoryAccumulator;
pub use changes::{ChangeFeedClient, ChangeSource, RC_PROPERTIES, parse_response, request_params};
