//! The AI decision seam.
//!
//! On every non-player turn the session hands an [`AiController`] a read-only
//! [`TurnView`] and resolves whatever [`Decision`] comes back, synchronously.
//! The engine only requires that the decision names a living combatant in
//! the roster and an ability the actor owns; everything else is up to the
//! controller.
//!
//! [`AggressiveAi`] is a small default: hit the weakest living opponent with
//! the strongest ability that is ready and affordable.
//!
//! # Example
//!
//! ```
//! use skirmish_core::ai::{AiController, Decision, TurnView};
//!
//! /// Always passes.
//! struct Pacifist;
//!
//! impl AiController for Pacifist {
//!     fn decide_action(&mut self, _view: &TurnView<'_>) -> Option<Decision> {
//!         None
//!     }
//! }
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::ability::{AbilityId, Effect};
use crate::combatant::{CombatantId, CombatantState};
use crate::registry::Loadout;

/// What an AI-controlled combatant wants to do this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Target of the ability.
    pub target: CombatantId,
    /// Ability from the actor's loadout.
    pub ability: AbilityId,
}

impl Decision {
    /// Convenience constructor.
    #[must_use]
    pub fn new(target: CombatantId, ability: impl Into<AbilityId>) -> Self {
        Self {
            target,
            ability: ability.into(),
        }
    }
}

/// Read-only snapshot handed to an [`AiController`].
#[derive(Debug, Clone, Copy)]
pub struct TurnView<'a> {
    /// The combatant whose turn it is.
    pub actor: &'a CombatantState,
    /// Every combatant, in turn order.
    pub roster: &'a [CombatantState],
    /// The actor's abilities and their cooldowns.
    pub loadout: &'a Loadout,
    /// Current round, starting at 1.
    pub round: u32,
}

impl<'a> TurnView<'a> {
    /// Living combatants on the other side.
    pub fn opponents(&self) -> impl Iterator<Item = &'a CombatantState> + 'a {
        let team = self.actor.team();
        self.roster
            .iter()
            .filter(move |state| state.is_alive() && state.team() != team)
    }

    /// Living combatants on the actor's side, the actor included.
    pub fn allies(&self) -> impl Iterator<Item = &'a CombatantState> + 'a {
        let team = self.actor.team();
        self.roster
            .iter()
            .filter(move |state| state.is_alive() && state.team() == team)
    }
}

/// Chooses actions for AI-controlled combatants.
///
/// Returning `None` passes the turn. Controllers must be `Send` so a session
/// can be moved to a worker thread.
pub trait AiController: Send {
    /// Picks a target and ability for `view.actor`.
    fn decide_action(&mut self, view: &TurnView<'_>) -> Option<Decision>;
}

impl<F> AiController for F
where
    F: FnMut(&TurnView<'_>) -> Option<Decision> + Send,
{
    fn decide_action(&mut self, view: &TurnView<'_>) -> Option<Decision> {
        self(view)
    }
}

/// Targets the living opponent with the least health (first in turn order on
/// ties) using the highest-power damaging ability it can use right now.
///
/// Passes when no opponent is standing or nothing is usable.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggressiveAi;

impl AggressiveAi {
    /// Creates the controller.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AiController for AggressiveAi {
    fn decide_action(&mut self, view: &TurnView<'_>) -> Option<Decision> {
        let target = view.opponents().min_by(|a, b| {
            a.health()
                .current()
                .partial_cmp(&b.health().current())
                .unwrap_or(Ordering::Equal)
        })?;
        let ability = view
            .loadout
            .usable(view.actor.resource().current())
            .filter(|ability| ability.effect == Effect::Damage)
            .reduce(|best, next| if next.power > best.power { next } else { best })?;
        Some(Decision::new(target.id(), ability.id.clone()))
    }
}
