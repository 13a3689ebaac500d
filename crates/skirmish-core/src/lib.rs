//! # Skirmish Core
//!
//! Turn-based combat resolution for Skirmish.
//!
//! This crate sequences combatants through turns, gates abilities on
//! resources and cooldowns, resolves damage under a
//! resistance/critical/combo model, and tracks time-windowed hit combos.
//! Rendering, audio, UI and AI policy live elsewhere and talk to the engine
//! through [`CombatSession`], [`AiController`] and [`CombatEvent`].
//!
//! ## Architecture
//!
//! - **Combatants** ([`combatant`]): health and resource pools, resistances
//! - **Abilities** ([`ability`]): immutable, shared templates
//! - **Registry** ([`registry`]): per-combatant cooldowns and the use gates
//! - **Resolver** ([`resolver`]): the damage formula and crit roll
//! - **Combos** ([`combo`]): consecutive-hit counters on [`tempo`] timers
//! - **Session** ([`session`]): roster, turn loop, end-of-combat
//!
//! The host drives time with [`CombatSession::tick`]. Nothing in the engine
//! reads a clock, so a session replays identically from the same seed and
//! the same calls.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use skirmish_core::prelude::*;
//!
//! let slash = Arc::new(Ability::new("slash", "Slash", 12.0).with_cooldown(1.0));
//! let knight = Entrant::new(CombatantState::new(CombatantId::new(1), "Knight", Team::Player, 40.0, 0.0))
//!     .with_ability(Arc::clone(&slash));
//! let wolf = Entrant::new(CombatantState::new(CombatantId::new(2), "Wolf", Team::Enemy, 20.0, 0.0))
//!     .with_ability(slash);
//!
//! let mut session = CombatSession::new(CombatConfig::with_seed(7), AggressiveAi::new())?;
//! session.start(vec![knight], vec![wolf])?;
//!
//! while let Phase::AwaitingAction(actor) = session.phase() {
//!     session.tick(1.0)?;
//!     session.submit_action(actor, CombatantId::new(2), &AbilityId::new("slash"))?;
//! }
//!
//! assert_eq!(session.phase(), Phase::Ended { winner: Some(Team::Player) });
//! # Ok::<(), skirmish_core::error::SessionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ability;
pub mod ai;
pub mod combatant;
pub mod combo;
pub mod config;
pub mod error;
pub mod event;
pub mod registry;
pub mod resolver;
pub mod roster;
pub mod session;

pub use ai::{AggressiveAi, AiController, Decision, TurnView};
pub use error::{Decline, SessionError};
pub use event::CombatEvent;
pub use session::{CombatSession, Entrant, Phase};

/// Re-export of the timer crate.
pub use tempo;

/// The types most hosts need.
pub mod prelude {
    pub use crate::ability::{Ability, AbilityId, DamageType, Effect};
    pub use crate::ai::{AggressiveAi, AiController, Decision, TurnView};
    pub use crate::combatant::{CombatantId, CombatantState, Resistances, Team};
    pub use crate::config::{ComboConfig, CombatConfig};
    pub use crate::error::{Decline, SessionError};
    pub use crate::event::CombatEvent;
    pub use crate::resolver::{DamageFormula, Resolution};
    pub use crate::session::{CombatSession, Entrant, Phase};
}

#[cfg(test)]
mod tests;
