//! CSV date-list loader.
//!
//! # CSV format
//!
//! A single `date` column in `YYYY-MM-DD` form.  Extra columns are ignored,
//! so a treatment or survey log can be fed in directly.
//!
//! ```csv
//! date
//! 2020-04-01
//! 2020-07-15
//! ```
//!
//! The result is sorted and de-duplicated, ready for
//! [`FrequencyRule::OnDates`](crate::FrequencyRule::OnDates).

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use pops_core::Date;

use crate::ScheduleError;

#[derive(Deserialize)]
struct DateRecord {
    date: String,
}

/// Load a date list from a CSV file.
pub fn load_dates_csv(path: &Path) -> Result<Vec<Date>, ScheduleError> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_dates_reader(file)
}

/// Like [`load_dates_csv`] but accepts any `Read` source.
pub fn load_dates_reader<R: Read>(reader: R) -> Result<Vec<Date>, ScheduleError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut dates = Vec::new();
    for result in csv_reader.deserialize::<DateRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        dates.push(row.date.parse::<Date>()?);
    }
    dates.sort_unstable();
    dates.dedup();
    Ok(dates)
}
