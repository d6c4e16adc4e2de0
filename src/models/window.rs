//! Time window handed from the planner to the change feed client.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout the recent changes API expects for `rcstart` / `rcend`.
pub const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One tumbling window, inclusive on both ends.
///
/// The field names follow the API, which walks backwards in time:
/// `window_start` is the chronologically *later* bound (sent as `rcstart`)
/// and `window_end` the *earlier* one (sent as `rcend`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    window_end: DateTime<Utc>,
    window_start: DateTime<Utc>,
}

impl WindowSpec {
    /// Build a window, or `None` if `window_end` is after `window_start`.
    pub fn new(window_end: DateTime<Utc>, window_start: DateTime<Utc>) -> Option<Self> {
        (window_end <= window_start).then_some(Self {
            window_end,
            window_start,
        })
    }

    /// Chronologically earlier bound.
    pub fn window_end(&self) -> DateTime<Utc> {
        self.window_end
    }

    /// Chronologically later bound.
    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    /// Value for the `rcstart` request parameter.
    pub fn rcstart(&self) -> String {
        self.window_start.format(API_TIMESTAMP_FORMAT).to_string()
    }

    /// Value for the `rcend` request parameter.
    pub fn rcend(&self) -> String {
        self.window_end.format(API_TIMESTAMP_FORMAT).to_string()
    }

    /// Number of whole seconds covered, counting both bounds.
    pub fn width_secs(&self) -> i64 {
        (self.window_start - self.window_end).num_seconds() + 1
    }

    /// Whether `timestamp` falls inside `[window_end, window_start]`.
    ///
    /// The API reports whole seconds, so anything within the last second is in.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.window_end
            && timestamp < self.window_start + chrono::Duration::seconds(1)
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.rcend(), self.rcstart())
    }
}
