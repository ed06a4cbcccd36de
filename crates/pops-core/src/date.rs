//! Day-granular calendar model.
//!
//! The simulation advances one calendar day per step.  `Date` is a thin,
//! immutable wrapper over `chrono::NaiveDate` that exposes only the queries
//! the scheduler and the orchestrator need: ordering, day arithmetic, month
//! and year boundaries, and season membership.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};

use crate::{PopsError, PopsResult};

// ── Date ──────────────────────────────────────────────────────────────────────

/// A calendar date (proleptic Gregorian).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Validate and build a date.  `Date::new(2023, 2, 29)` is an error.
    pub fn new(year: i32, month: u32, day: u32) -> PopsResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| PopsError::Config(format!("invalid date {year:04}-{month:02}-{day:02}")))
    }

    #[inline]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    #[inline]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    #[inline]
    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// The following day, or `None` at the end of the representable range.
    #[inline]
    pub fn next_day(self) -> Option<Date> {
        self.0.succ_opt().map(Date)
    }

    #[inline]
    pub fn add_days(self, n: u64) -> Option<Date> {
        self.0.checked_add_days(Days::new(n)).map(Date)
    }

    /// Signed number of days from `self` to `other` (negative if `other`
    /// is earlier).
    #[inline]
    pub fn days_until(self, other: Date) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }

    pub fn is_leap_year(self) -> bool {
        let y = self.year();
        (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
    }

    pub fn is_last_day_of_month(self) -> bool {
        match self.0.succ_opt() {
            Some(next) => next.month() != self.month(),
            None => true,
        }
    }

    pub fn is_last_day_of_year(self) -> bool {
        self.month() == 12 && self.day() == 31
    }

    /// Number of days in the closed range `[start, end]`; 0 if inverted.
    pub fn days_inclusive(start: Date, end: Date) -> usize {
        let span = start.days_until(end);
        if span < 0 { 0 } else { span as usize + 1 }
    }

    /// Iterate over every day in `[start, end]`.  Empty if `end < start`.
    pub fn iter_days(start: Date, end: Date) -> DayIter {
        DayIter { next: (start <= end).then_some(start), end }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Date {
    type Err = PopsError;

    /// Parse `YYYY-MM-DD`.
    fn from_str(s: &str) -> PopsResult<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|e| PopsError::Parse(format!("invalid date {s:?}: {e}")))
    }
}

/// Inclusive day iterator produced by [`Date::iter_days`].
#[derive(Clone, Debug)]
pub struct DayIter {
    next: Option<Date>,
    end:  Date,
}

impl Iterator for DayIter {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let current = self.next?;
        self.next = current.next_day().filter(|d| *d <= self.end);
        Some(current)
    }
}

// ── Season ────────────────────────────────────────────────────────────────────

/// A run of months during which a pest is active.
///
/// `start_month > end_month` wraps across the year end, so
/// `Season { start_month: 11, end_month: 2 }` covers Nov, Dec, Jan, Feb.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Season {
    pub start_month: u32,
    pub end_month:   u32,
}

impl Season {
    pub fn new(start_month: u32, end_month: u32) -> PopsResult<Self> {
        let season = Self { start_month, end_month };
        season.validate()?;
        Ok(season)
    }

    /// Both months must lie in `1..=12`.
    pub fn validate(&self) -> PopsResult<()> {
        for m in [self.start_month, self.end_month] {
            if !(1..=12).contains(&m) {
                return Err(PopsError::Config(format!("season month {m} outside 1..=12")));
            }
        }
        Ok(())
    }

    pub fn contains_month(&self, month: u32) -> bool {
        if self.start_month <= self.end_month {
            (self.start_month..=self.end_month).contains(&month)
        } else {
            month >= self.start_month || month <= self.end_month
        }
    }

    #[inline]
    pub fn contains(&self, date: Date) -> bool {
        self.contains_month(date.month())
    }
}
