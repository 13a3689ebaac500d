//! Observation events.
//!
//! The session records a [`CombatEvent`] for every externally interesting
//! change and buffers them until the host drains the log with
//! [`CombatSession::take_events`](crate::session::CombatSession::take_events).
//! UI, audio and telemetry collaborators react to these; the engine never
//! calls back into them.

use serde::{Deserialize, Serialize};

use crate::ability::{AbilityId, Effect};
use crate::combatant::{CombatantId, Team};
use crate::combo::ComboUpdate;
use crate::error::Decline;
use crate::resolver::Resolution;

/// Something that happened during an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// The encounter began with this many combatants.
    CombatStarted {
        /// Roster size.
        combatants: usize,
    },
    /// `actor` holds the turn.
    TurnStarted {
        /// Turn holder.
        actor: CombatantId,
        /// Round number, starting at 1.
        round: u32,
    },
    /// `actor` ended its turn without acting.
    TurnPassed {
        /// Turn holder.
        actor: CombatantId,
    },
    /// An action was refused.
    ActionDeclined {
        /// Who tried to act.
        actor: CombatantId,
        /// Why.
        reason: Decline,
    },
    /// An ability resolved.
    ActionResolved {
        /// Caster.
        actor: CombatantId,
        /// Target.
        target: CombatantId,
        /// Ability used.
        ability: AbilityId,
        /// Health removed or restored.
        amount: f32,
        /// Critical hit.
        was_crit: bool,
        /// Damage or heal.
        effect: Effect,
    },
    /// A combo grew or lapsed.
    ComboChanged {
        /// Combo owner.
        actor: CombatantId,
        /// New hit count, 0 when lapsed.
        hit_count: u32,
        /// Multiplier for the current count.
        multiplier: f32,
    },
    /// A combatant's health reached 0.
    CombatantDefeated {
        /// Defeated combatant.
        actor: CombatantId,
    },
    /// The encounter is over.
    CombatEnded {
        /// Side with survivors, `None` for a forced end.
        winner: Option<Team>,
    },
}

impl CombatEvent {
    /// The `ActionResolved` event for a resolution.
    #[must_use]
    pub fn resolved(resolution: &Resolution) -> Self {
        Self::ActionResolved {
            actor: resolution.actor,
            target: resolution.target,
            ability: resolution.ability.clone(),
            amount: resolution.applied,
            was_crit: resolution.was_crit,
            effect: resolution.effect,
        }
    }

    /// The `ComboChanged` event for a combo update.
    #[must_use]
    pub fn combo(update: &ComboUpdate) -> Self {
        Self::ComboChanged {
            actor: update.actor,
            hit_count: update.hit_count,
            multiplier: update.multiplier,
        }
    }

    /// Returns true for [`CombatEvent::CombatEnded`].
    #[must_use]
    pub const fn is_end(&self) -> bool {
        matches!(self, Self::CombatEnded { .. })
    }
}
