//! `pops-schedule` — per-day activity schedules for the spread engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                            |
//! |---------------|-----------------------------------------------------|
//! | [`rule`]      | `FrequencyRule` (daily, every N days, monthly, …)   |
//! | [`scheduler`] | `Scheduler`, `ScheduleFlags`                        |
//! | [`loader`]    | `load_dates_csv`, `load_dates_reader`               |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                |
//!
//! # Usage
//!
//! ```rust,ignore
//! let scheduler = Scheduler::new(date_start, date_end);
//! let spread    = scheduler.build(&FrequencyRule::InSeason(Season::new(3, 9)?))?;
//! let mortality = scheduler.build(&FrequencyRule::EndOfYear)?;
//! if spread.is_active(day) { /* disperse */ }
//! ```

pub mod error;
pub mod loader;
pub mod rule;
pub mod scheduler;


pub use error::{ScheduleError, ScheduleResult};
pub use loader::{load_dates_csv, load_dates_reader};
pub use rule::FrequencyRule;
pub use scheduler::{ScheduleFlags, Scheduler};
