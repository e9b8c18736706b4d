//! Calendar-quarter sequencing for the full-index archive layout.
//!
//! The archive publishes one index per calendar quarter; everything upstream
//! of the fetch layer addresses data by `(year, quarter)` pairs.

use chrono::{Datelike, Utc};
use std::fmt;

/// One archive period: a calendar year and quarter.
///
/// Ordering is lexicographic on `(year, quarter)`, which coincides with
/// chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterKey {
    /// Calendar year.
    pub year: i32,
    /// Quarter within the year, 1 through 4.
    pub quarter: u8,
}

impl QuarterKey {
    /// Create a quarter key.
    ///
    /// `quarter` is expected to be in `1..=4`; this is only asserted in
    /// debug builds, release builds follow the rollover arithmetic.
    pub fn new(year: i32, quarter: u8) -> Self {
        debug_assert!(
            (1..=4).contains(&quarter),
            "quarter out of range: {quarter}"
        );
        Self { year, quarter }
    }

    /// The quarter following this one, rolling over past Q4.
    pub const fn next(self) -> Self {
        if self.quarter >= 4 {
            Self {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }

    /// The quarter containing today's date (UTC).
    pub fn current() -> Self {
        let today = Utc::now().date_naive();
        Self::new(today.year(), ((today.month() - 1) / 3 + 1) as u8)
    }
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

/// Inclusive, lazy iterator over consecutive quarters.
///
/// Produced by [`quarter_range`]; a pure function of its endpoints, so a
/// fresh range over the same endpoints restarts the walk.
#[derive(Debug, Clone)]
pub struct QuarterRange {
    upcoming: Option<QuarterKey>,
    end: QuarterKey,
}

/// All quarters from `start` through `end`, inclusive of both endpoints.
///
/// Empty when `start` is after `end`.
pub fn quarter_range(start: QuarterKey, end: QuarterKey) -> QuarterRange {
    QuarterRange {
        upcoming: (start <= end).then_some(start),
        end,
    }
}

impl Iterator for QuarterRange {
    type Item = QuarterKey;

    fn next(&mut self) -> Option<QuarterKey> {
        let current = self.upcoming?;
        self.upcoming = (current < self.end).then(|| current.next());
        Some(current)
    }
}
