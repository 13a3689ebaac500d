//! # Skirmish Sim
//!
//! Headless runner for Skirmish encounters. Loads an [`Encounter`] from
//! JSON, plays it to the end with autopilot players, and reports the
//! outcome. Batches of seeded runs execute in parallel on `rayon`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod encounter;
pub mod runner;

pub use encounter::{CombatantSpec, Encounter};
pub use runner::{run, run_batch, BatchReport, CombatantSummary, RunSummary};
