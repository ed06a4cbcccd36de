//! `Scheduler` and `ScheduleFlags`.
//!
//! # Flag model
//!
//! A schedule covers the closed range `[start, end]` with one boolean per
//! day:
//!
//! ```text
//! index  = start.days_until(date)
//! active = rule.is_active(index, date)
//! ```
//!
//! Flags are computed once at model setup and read-only afterwards.  An
//! inverted range yields an empty schedule, and a rule that never fires
//! yields all-`false`; neither is an error.

use std::fmt;

use pops_core::Date;

use crate::{FrequencyRule, ScheduleResult};

// ── ScheduleFlags ─────────────────────────────────────────────────────────────

/// One activity flag per simulated day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleFlags {
    start: Date,
    flags: Vec<bool>,
}

impl ScheduleFlags {
    pub fn start(&self) -> Date {
        self.start
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// `false` for indices past the end.
    #[inline]
    pub fn is_active(&self, day: usize) -> bool {
        self.flags.get(day).copied().unwrap_or(false)
    }

    /// Flag for a calendar date; `false` outside the covered range.
    pub fn is_active_on(&self, date: Date) -> bool {
        let index = self.start.days_until(date);
        index >= 0 && self.is_active(index as usize)
    }

    pub fn count_active(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// For an active day, the number of active days before it.
    ///
    /// This converts a simulation day into an action step, e.g. "the third
    /// mortality event".  Returns `None` if `day` is not active.
    pub fn action_index(&self, day: usize) -> Option<usize> {
        if !self.is_active(day) {
            return None;
        }
        Some(self.flags[..day].iter().filter(|&&f| f).count())
    }

    /// Raw flags for inspection.
    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }
}

impl fmt::Display for ScheduleFlags {
    /// `1` for active days, `0` otherwise, e.g. `"1001001"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &flag in &self.flags {
            f.write_str(if flag { "1" } else { "0" })?;
        }
        Ok(())
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// The simulated date range that schedules are built over.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scheduler {
    start: Date,
    end:   Date,
}

impl Scheduler {
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    /// Days in `[start, end]`; 0 if the range is inverted.
    pub fn num_days(&self) -> usize {
        Date::days_inclusive(self.start, self.end)
    }

    /// The date of day `index`, or `None` past the end.
    pub fn date_of(&self, index: usize) -> Option<Date> {
        if index >= self.num_days() {
            return None;
        }
        self.start.add_days(index as u64)
    }

    /// Flags for every day in `[start, end]`.
    pub fn build(&self, rule: &FrequencyRule) -> ScheduleResult<ScheduleFlags> {
        rule.validate()?;
        let flags = Date::iter_days(self.start, self.end)
            .enumerate()
            .map(|(i, date)| rule.is_active(i, date))
            .collect();
        Ok(ScheduleFlags { start: self.start, flags })
    }

    /// Flags for `num_days` days from `start`, independent of any model.
    ///
    /// Debug helper for checking a rule against an arbitrary horizon.
    pub fn flags_for_days(
        start:    Date,
        num_days: usize,
        rule:     &FrequencyRule,
    ) -> ScheduleResult<ScheduleFlags> {
        match num_days.checked_sub(1).and_then(|n| start.add_days(n as u64)) {
            Some(end) => Scheduler::new(start, end).build(rule),
            None => {
                rule.validate()?;
                Ok(ScheduleFlags { start, flags: Vec::new() })
            }
        }
    }
}
