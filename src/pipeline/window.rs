// src/pipeline/window.rs

//! Tumbling window planner.
//!
//! Splits one UTC calendar day into contiguous, non-overlapping windows of a
//! fixed width. Every window is inclusive on both ends, so consecutive windows
//! meet at a one-second step:
//!
//! ```text
//! 00:00:00 ── 00:00:29 | 00:00:30 ── 00:00:59 | ... | 23:59:30 ── 23:59:59
//! ```
//!
//! Only the last window can be narrower than the configured width; it is
//! clipped to 23:59:59. Any width of a day or more yields the single
//! whole-day window.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::ConfigError;
use crate::models::WindowSpec;

const SECONDS_PER_DAY: i64 = 86_400;

/// Parse a `YYYY-MM-DD` target date.
pub fn parse_target_date(input: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDate(input.to_string()))
}

/// Plans the windows covering one day.
#[derive(Debug, Clone, Copy)]
pub struct WindowPlanner {
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
    window_size: Duration,
}

impl WindowPlanner {
    /// Create a planner for `date` (UTC midnight to 23:59:59).
    pub fn new(date: NaiveDate, window_size_secs: i64) -> Result<Self, ConfigError> {
        if window_size_secs <= 0 {
            return Err(ConfigError::InvalidWindowSize(window_size_secs));
        }
        let invalid_date = || ConfigError::InvalidDate(date.to_string());
        let day_start = date.and_hms_opt(0, 0, 0).ok_or_else(invalid_date)?.and_utc();
        let day_end = day_start
            .checked_add_signed(Duration::seconds(SECONDS_PER_DAY - 1))
            .ok_or_else(invalid_date)?;

        Ok(Self {
            day_start,
            day_end,
            window_size: Duration::seconds(window_size_secs.min(SECONDS_PER_DAY)),
        })
    }

    pub fn day_start(&self) -> DateTime<Utc> {
        self.day_start
    }

    pub fn day_end(&self) -> DateTime<Utc> {
        self.day_end
    }

    /// Number of windows the planner emits.
    pub fn window_count(&self) -> usize {
        let size = self.window_size.num_seconds();
        ((SECONDS_PER_DAY + size - 1) / size) as usize
    }

    /// Fresh iterator over the day's windows, earliest first.
    pub fn windows(&self) -> Windows {
        Windows {
            cursor: Some(self.day_start),
            day_end: self.day_end,
            window_size: self.window_size,
        }
    }
}

/// Lazy iterator produced by [`WindowPlanner::windows`].
#[derive(Debug, Clone)]
pub struct Windows {
    cursor: Option<DateTime<Utc>>,
    day_end: DateTime<Utc>,
    window_size: Duration,
}

impl Iterator for Windows {
    type Item = WindowSpec;

    fn next(&mut self) -> Option<WindowSpec> {
        // Loop while the cursor is still inside the day so 23:59:59 is always covered.
        let window_end = self.cursor.filter(|cursor| *cursor <= self.day_end)?;

        self.cursor = window_end.checked_add_signed(self.window_size);
        let window_start = match self.cursor {
            Some(next) => (next - Duration::seconds(1)).min(self.day_end),
            None => self.day_end,
        };

        WindowSpec::new(window_end, window_start)
    }
}
