//! The `Model` struct and its day loop.

use tracing::{debug, info, info_span};

use pops_core::{Date, Grid, SimRng};
use pops_schedule::{ScheduleFlags, Scheduler};

use crate::{
    Config, DayFlags, HostPool, ModelObserver, QuarantineAreas, QuarantineReport, RemovalRequest, SimResult,
    SpreadEngine, SpreadRate, StepReport,
};

/// Which infected-grid snapshots [`Model::run`] keeps.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum SnapshotMode {
    EveryDay,
    #[default]
    FinalOnly,
}

/// Everything a finished run hands back.
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// Infected counts by date.
    pub snapshots:   Vec<(Date, Grid<i32>)>,
    pub final_hosts: HostPool,
    pub spread_rate: SpreadRate,
    pub days_run:    usize,
}

/// Per-process day flags, built once per run.
#[derive(Clone, Debug)]
pub(crate) struct Schedules {
    pub(crate) spread:             ScheduleFlags,
    pub(crate) mortality:          ScheduleFlags,
    pub(crate) movement:           ScheduleFlags,
    pub(crate) spread_rate:        ScheduleFlags,
    pub(crate) lethal_temperature: ScheduleFlags,
    pub(crate) survival_rate:      ScheduleFlags,
}

impl Schedules {
    fn flags(&self, day: usize) -> DayFlags {
        DayFlags {
            spread:             self.spread.is_active(day),
            mortality:          self.mortality.is_active(day),
            movement:           self.movement.is_active(day),
            spread_rate:        self.spread_rate.is_active(day),
            lethal_temperature: self.lethal_temperature.is_active(day),
            survival_rate:      self.survival_rate.is_active(day),
        }
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// One simulation run.
///
/// Owns the host state, the spread engine, its random source and the
/// per-process schedules.  Advance one day with [`run_step`](Self::run_step)
/// or to the end with [`run`](Self::run).
///
/// Create via [`ModelBuilder`][crate::ModelBuilder].
#[derive(Debug)]
pub struct Model {
    pub(crate) engine:          SpreadEngine,
    pub(crate) hosts:           HostPool,
    pub(crate) rng:             SimRng,
    pub(crate) scheduler:       Scheduler,
    pub(crate) schedules:       Schedules,
    pub(crate) spread_rate:     SpreadRate,
    pub(crate) quarantine:      Option<QuarantineAreas>,
    /// Index of the next day to simulate.
    pub(crate) day:             usize,
    pub(crate) rate_steps_done: usize,
}

impl Model {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        self.engine.config()
    }

    pub fn hosts(&self) -> &HostPool {
        &self.hosts
    }

    /// Mutable host access between days, e.g. for manual interventions.
    pub fn hosts_mut(&mut self) -> &mut HostPool {
        &mut self.hosts
    }

    pub fn spread_rate(&self) -> &SpreadRate {
        &self.spread_rate
    }

    /// Date of the next day to simulate, `None` once the run is complete.
    pub fn next_date(&self) -> Option<Date> {
        self.scheduler.date_of(self.day)
    }

    pub fn is_finished(&self) -> bool {
        self.next_date().is_none()
    }

    /// Queue a host removal for the next removal process.
    pub fn queue_removal(&mut self, request: RemovalRequest) {
        self.engine.queue_removal(request);
    }

    /// Quarantine status of the current infection, if areas were supplied.
    pub fn quarantine_report(&self) -> Option<QuarantineReport> {
        self.quarantine.as_ref().map(|q| q.escape_report(&self.hosts.infected))
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Advance exactly one day.  Returns `Ok(None)` past `date_end`.
    pub fn run_step(&mut self) -> SimResult<Option<StepReport>> {
        let Some(date) = self.scheduler.date_of(self.day) else {
            return Ok(None);
        };
        let day = self.day;
        let flags = self.schedules.flags(day);
        let report = self.engine.step(&mut self.hosts, &mut self.rng, date, day, flags)?;

        if flags.spread_rate && self.rate_steps_done < self.spread_rate.num_steps() {
            self.spread_rate.record(&self.hosts.infected, self.rate_steps_done);
            self.rate_steps_done += 1;
        }
        self.day += 1;

        debug!(
            %date,
            generated = report.dispersers_generated,
            established = report.established,
            lost = report.lost_dispersers,
            outside = report.outside_dispersers.len(),
            deaths = report.deaths,
            moved = report.moved,
            "day done"
        );
        Ok(Some(report))
    }

    /// Run from the current day to `date_end`.
    ///
    /// Calls observer hooks at every day boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: ModelObserver>(&mut self, observer: &mut O, mode: SnapshotMode) -> SimResult<RunOutput> {
        self.drive(observer, mode, |_| false)
    }

    /// Like [`run`](Self::run) with [`SnapshotMode::FinalOnly`], but checks
    /// `should_stop` before each day and stops early when it returns `true`.
    pub fn run_until<O, F>(&mut self, observer: &mut O, should_stop: F) -> SimResult<RunOutput>
    where
        O: ModelObserver,
        F: FnMut(Date) -> bool,
    {
        self.drive(observer, SnapshotMode::FinalOnly, should_stop)
    }

    fn drive<O, F>(&mut self, observer: &mut O, mode: SnapshotMode, mut should_stop: F) -> SimResult<RunOutput>
    where
        O: ModelObserver,
        F: FnMut(Date) -> bool,
    {
        let config = self.engine.config();
        let span = info_span!("model_run", seed = config.random_seed);
        let _guard = span.enter();
        info!(
            start = %config.date_start,
            end = %config.date_end,
            rows = config.rows,
            cols = config.cols,
            "run starting"
        );

        let mut snapshots = Vec::new();
        let mut last_date = None;
        let first_day = self.day;

        while let Some(date) = self.next_date() {
            if should_stop(date) {
                info!(%date, "run stopped early");
                break;
            }
            observer.on_day_start(date, self.day);
            let Some(report) = self.run_step()? else { break };
            observer.on_day_end(&report);
            if mode == SnapshotMode::EveryDay {
                observer.on_snapshot(date, &self.hosts.infected);
                snapshots.push((date, self.hosts.infected.clone()));
            }
            last_date = Some(date);
        }

        if mode == SnapshotMode::FinalOnly {
            if let Some(date) = last_date {
                observer.on_snapshot(date, &self.hosts.infected);
                snapshots.push((date, self.hosts.infected.clone()));
            }
        }
        observer.on_run_end(last_date, &self.hosts);

        let days_run = self.day - first_day;
        info!(
            days = days_run,
            infected = self.hosts.total_infected(),
            died = self.hosts.total_died(),
            "run finished"
        );

        Ok(RunOutput {
            snapshots,
            final_hosts: self.hosts.clone(),
            spread_rate: self.spread_rate.clone(),
            days_run,
        })
    }
}
