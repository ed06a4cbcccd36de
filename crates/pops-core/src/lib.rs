//! `pops-core` — foundational types for the `pops` spread simulation engine.
//!
//! This crate is a dependency of every other `pops-*` crate.  It has no
//! `pops-*` dependencies and few external ones (`rand`, `chrono`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`grid`]        | `Grid<T>` (owned), `GridView<'a, T>` (borrowed), `Cell` |
//! | [`date`]        | `Date`, `Season`, day iteration                       |
//! | [`direction`]   | `Direction` compass enum                              |
//! | [`rng`]         | `SimRng` (per-run generator)                          |
//! | [`error`]       | `PopsError`, `PopsResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod date;
pub mod direction;
pub mod error;
pub mod grid;
pub mod rng;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use date::{Date, DayIter, Season};
pub use direction::Direction;
pub use error::{PopsError, PopsResult};
pub use grid::{Cell, Grid, GridAccess, GridView};
pub use rng::SimRng;
