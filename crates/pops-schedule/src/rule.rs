//! Frequency rules: which calendar days a process runs on.
//!
//! Rules are part of the configuration file.  They use an internally tagged
//! representation with a `kind` key:
//!
//! ```yaml
//! spread_schedule:    { kind: in_season, start_month: 3, end_month: 9 }
//! mortality_frequency: { kind: every_n_days, n: 7 }
//! movement_schedule:  { kind: monthly }
//! ```

use serde::{Deserialize, Serialize};

use pops_core::{Date, Season};

use crate::{ScheduleError, ScheduleResult};

/// When a governed process (spread, mortality, movement, …) is active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrequencyRule {
    /// Every simulated day.
    #[default]
    Daily,
    /// Days `0, n, 2n, …` counted from the schedule start.
    EveryNDays { n: u32 },
    /// The last day of each calendar month.
    Monthly,
    /// One fixed day every year.
    Yearly { month: u32, day: u32 },
    /// December 31st.
    EndOfYear,
    /// A single date.
    OnDate { date: Date },
    /// Any of the listed dates.
    OnDates { dates: Vec<Date> },
    /// Every day whose month lies in the season.
    InSeason(Season),
    /// No day at all.
    Never,
}

impl FrequencyRule {
    /// Build an `EveryNDays` rule, rejecting `n == 0`.
    pub fn every_n_days(n: u32) -> ScheduleResult<Self> {
        let rule = FrequencyRule::EveryNDays { n };
        rule.validate()?;
        Ok(rule)
    }

    /// Check parameters that serde cannot express.
    pub fn validate(&self) -> ScheduleResult<()> {
        match self {
            FrequencyRule::EveryNDays { n: 0 } => Err(ScheduleError::InvalidRule(
                "every_n_days requires n >= 1".into(),
            )),
            FrequencyRule::Yearly { month, day } => {
                // 2000 is a leap year, so Feb 29 is accepted as a yearly day.
                Date::new(2000, *month, *day)
                    .map(|_| ())
                    .map_err(|_| ScheduleError::InvalidRule(format!("yearly day {month}/{day} does not exist")))
            }
            FrequencyRule::InSeason(season) => season
                .validate()
                .map_err(|e| ScheduleError::InvalidRule(e.to_string())),
            _ => Ok(()),
        }
    }

    /// Is the process active on `date`, the `index`-th day of the schedule?
    pub fn is_active(&self, index: usize, date: Date) -> bool {
        match self {
            FrequencyRule::Daily => true,
            FrequencyRule::EveryNDays { n } => *n > 0 && index % *n as usize == 0,
            FrequencyRule::Monthly => date.is_last_day_of_month(),
            FrequencyRule::Yearly { month, day } => date.month() == *month && date.day() == *day,
            FrequencyRule::EndOfYear => date.is_last_day_of_year(),
            FrequencyRule::OnDate { date: on } => date == *on,
            FrequencyRule::OnDates { dates } => dates.contains(&date),
            FrequencyRule::InSeason(season) => season.contains(date),
            FrequencyRule::Never => false,
        }
    }
}
