//! Model observer trait for progress reporting and data collection.

use pops_core::{Date, Grid};

use crate::{HostPool, StepReport};

/// Callbacks invoked by [`Model::run`][crate::Model::run] at key points in
/// the day loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — infection counter
///
/// ```rust,ignore
/// struct NewInfections(u64);
///
/// impl ModelObserver for NewInfections {
///     fn on_day_end(&mut self, report: &StepReport) {
///         self.0 += report.established;
///     }
/// }
/// ```
pub trait ModelObserver {
    /// Called before any process runs on `date`.
    fn on_day_start(&mut self, _date: Date, _day_index: usize) {}

    /// Called after every process due on the day has run.
    fn on_day_end(&mut self, _report: &StepReport) {}

    /// Called for each infected-grid snapshot the run keeps.
    fn on_snapshot(&mut self, _date: Date, _infected: &Grid<i32>) {}

    /// Called once after the last simulated day.
    fn on_run_end(&mut self, _last_date: Option<Date>, _hosts: &HostPool) {}
}

/// A [`ModelObserver`] that does nothing.
pub struct NoopObserver;

impl ModelObserver for NoopObserver {}
