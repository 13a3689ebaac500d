//! Cross-module tests for the combat engine.
//!
//! - `helpers.rs`: factories for combatants, abilities and sessions
//! - `integration.rs`: end-to-end encounters through the public session API
//! - `determinism.rs`: same seed and same calls give the same event stream
//! - `properties.rs`: proptest checks of the engine's invariants

mod determinism;
mod helpers;
mod integration;

pub use helpers::*;
