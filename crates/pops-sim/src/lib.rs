//! `pops-sim` — spread engine and day-loop orchestrator.
//!
//! # Day loop
//!
//! ```text
//! for day in date_start..=date_end:
//!   ① Disperse        — spread flag: generate, sample kernel, establish
//!   ② Mortality       — mortality flag: kill aged infected cohorts
//!   ③ Movement        — movement flag: network and dated host movement
//!   ④ Overpopulation  — push hosts above capacity into neighbours
//!   ⑤ Removal         — treatments and queued removal requests
//!   spread-rate flag  → record the infection bounding box
//! ```
//!
//! The order of ①–⑤ is `Config::process_order`.
//!
//! # Crate layout
//!
//! | Module          | Contents                                             |
//! |-----------------|------------------------------------------------------|
//! | [`config`]      | `Config` (YAML), `ModelType`, `Process`              |
//! | [`hosts`]       | `HostPool` compartments and cohorts                  |
//! | [`engine`]      | `SpreadEngine`, `StepReport`, `DayFlags`             |
//! | [`treatments`]  | `Treatments`, `Treatment`, `TreatmentApplication`    |
//! | [`movement`]    | `ScheduledMovement`, `load_movements_csv`            |
//! | [`spread_rate`] | `SpreadRate`, `average_spread_rate`, `BBox`          |
//! | [`quarantine`]  | `QuarantineAreas`, `QuarantineReport`                |
//! | [`builder`]     | `ModelBuilder`                                       |
//! | [`model`]       | `Model`, `RunOutput`, `SnapshotMode`                 |
//! | [`observer`]    | `ModelObserver`, `NoopObserver`                      |
//! | [`ensemble`]    | `run_ensemble`, `run_ensemble_with`                  |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs ensemble members on Rayon's thread pool.          |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pops_sim::{Config, HostPool, ModelBuilder, NoopObserver, SnapshotMode};
//!
//! let config = Config::load("landscape.yaml")?;
//! let hosts  = HostPool::new(susceptible, infected, capacity)?;
//! let mut model = ModelBuilder::new(config, hosts).build()?;
//! let output = model.run(&mut NoopObserver, SnapshotMode::FinalOnly)?;
//! ```

pub mod builder;
pub mod config;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod hosts;
pub mod model;
pub mod movement;
pub mod observer;
pub mod quarantine;
pub mod spread_rate;
pub mod treatments;


pub use builder::ModelBuilder;
pub use config::{Config, ModelType, Process};
pub use engine::{DayFlags, RemovalRequest, SpreadEngine, StepReport};
pub use ensemble::{run_ensemble, run_ensemble_with};
pub use error::{SimError, SimResult};
pub use hosts::HostPool;
pub use model::{Model, RunOutput, SnapshotMode};
pub use movement::{load_movements_csv, load_movements_reader, ScheduledMovement};
pub use observer::{ModelObserver, NoopObserver};
pub use quarantine::{AreaDistance, QuarantineAreas, QuarantineReport};
pub use spread_rate::{average_spread_rate, infection_boundary, BBox, Rate, SpreadRate};
pub use treatments::{PesticideEvent, Treatment, TreatmentApplication, TreatmentKind, Treatments};
