//! Error types for session control.
//!
//! Two tiers:
//! - [`Decline`]: an action the caller may simply retry differently. Nothing
//!   changed, the turn is still open.
//! - [`SessionError`]: everything else the host has to deal with, including
//!   integration faults such as an AI naming a combatant that is not in the
//!   roster.

use serde::{Deserialize, Serialize};

use crate::ability::{AbilityError, AbilityId};
use crate::combatant::CombatantId;
use crate::config::ConfigError;
use crate::roster::RosterError;

/// Why an action was refused without any state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Decline {
    /// No encounter is in progress.
    #[error("no combat in progress")]
    SessionInactive,
    /// Someone other than the turn holder tried to act.
    #[error("it is not {actor}'s turn")]
    NotYourTurn {
        /// Who tried to act.
        actor: CombatantId,
    },
    /// The chosen target is already defeated.
    #[error("target {target} is already defeated")]
    TargetDefeated {
        /// Defeated target.
        target: CombatantId,
    },
    /// The actor has no such ability in its loadout.
    #[error("{actor} does not know ability {ability}")]
    UnknownAbility {
        /// Actor.
        actor: CombatantId,
        /// Requested ability.
        ability: AbilityId,
    },
    /// The ability is still recovering.
    #[error("{ability} is on cooldown for another {remaining:.2}s")]
    OnCooldown {
        /// Requested ability.
        ability: AbilityId,
        /// Seconds left.
        remaining: f32,
    },
    /// The actor cannot pay for the ability.
    #[error("needs {needed} resource, has {available}")]
    InsufficientResource {
        /// Ability cost.
        needed: f32,
        /// Actor's current resource.
        available: f32,
    },
}

/// Errors surfaced to the host.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// The action was refused; the session is unchanged.
    #[error(transparent)]
    Declined(#[from] Decline),
    /// `start` was called while an encounter is already running.
    #[error("combat already in progress")]
    AlreadyActive,
    /// `start` was called on a session that already ended.
    #[error("session has ended; start a new session for a new encounter")]
    SessionOver,
    /// The parties could not form a roster.
    #[error(transparent)]
    Roster(#[from] RosterError),
    /// An ability template failed validation.
    #[error(transparent)]
    InvalidAbility(#[from] AbilityError),
    /// An actor or target id is not in the roster.
    #[error("combatant {0} is not in this encounter")]
    UnknownCombatant(CombatantId),
    /// The AI picked something the engine cannot carry out.
    #[error("AI decision for {actor} is invalid: {reason}")]
    InvalidAiDecision {
        /// AI-controlled actor whose turn it was.
        actor: CombatantId,
        /// What was wrong with the decision.
        reason: String,
    },
    /// A time step was negative or not finite.
    #[error("time step must be finite and >= 0 (got {0})")]
    InvalidDelta(f32),
    /// The session configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// The decline reason, if this is a plain refusal.
    #[must_use]
    pub fn as_decline(&self) -> Option<&Decline> {
        match self {
            Self::Declined(decline) => Some(decline),
            _ => None,
        }
    }
}
