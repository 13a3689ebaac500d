//! Turn-ordered combatant storage.
//!
//! The [`Roster`] owns every [`CombatantState`] in an encounter:
//! - Slots in join order (players first, then enemies), which is also turn order
//! - A `BTreeMap` index from [`CombatantId`] to slot for O(log n) lookups
//!
//! Slots never move and are never removed. A defeated combatant keeps its
//! slot at zero health, so a turn index stays valid for the whole
//! encounter.
//!
//! # Example
//!
//! ```
//! use skirmish_core::combatant::{CombatantId, CombatantState, Team};
//! use skirmish_core::roster::Roster;
//!
//! let hero = CombatantState::new(CombatantId::new(1), "Hero", Team::Player, 50.0, 10.0);
//! let imp = CombatantState::new(CombatantId::new(9), "Imp", Team::Enemy, 20.0, 0.0);
//!
//! let roster = Roster::from_parties(vec![hero], vec![imp]).unwrap();
//! assert_eq!(roster.len(), 2);
//! assert_eq!(roster.slot_of(CombatantId::new(9)), Some(1));
//! assert!(roster.has_living(Team::Enemy));
//! ```

use std::collections::BTreeMap;

use crate::combatant::{CombatantId, CombatantState, Team};

/// Problems found while building a roster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// Neither party has any entrants.
    #[error("cannot start an encounter with no combatants")]
    Empty,
    /// Two entrants share an id.
    #[error("combatant {0} joined twice")]
    Duplicate(CombatantId),
    /// An entrant's team tag does not match the party it joined with.
    #[error("combatant {id} is tagged {tagged} but joined the {party} party")]
    TeamMismatch {
        /// Offending combatant.
        id: CombatantId,
        /// Team it carries.
        tagged: Team,
        /// Party it was submitted with.
        party: Team,
    },
}

/// Ordered combatant container.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    slots: Vec<CombatantState>,
    index: BTreeMap<CombatantId, usize>,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster from the two parties, players first.
    ///
    /// # Errors
    ///
    /// Returns a [`RosterError`] if both parties are empty, an id repeats,
    /// or an entrant's team does not match its party.
    pub fn from_parties(
        players: Vec<CombatantState>,
        enemies: Vec<CombatantState>,
    ) -> Result<Self, RosterError> {
        if players.is_empty() && enemies.is_empty() {
            return Err(RosterError::Empty);
        }
        let mut roster = Self::new();
        for (party, entrants) in [(Team::Player, players), (Team::Enemy, enemies)] {
            for state in entrants {
                if state.team() != party {
                    return Err(RosterError::TeamMismatch {
                        id: state.id(),
                        tagged: state.team(),
                        party,
                    });
                }
                roster.push(state)?;
            }
        }
        Ok(roster)
    }

    fn push(&mut self, state: CombatantState) -> Result<usize, RosterError> {
        let id = state.id();
        if self.index.contains_key(&id) {
            return Err(RosterError::Duplicate(id));
        }
        let slot = self.slots.len();
        self.index.insert(id, slot);
        self.slots.push(state);
        Ok(slot)
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if there are no combatants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All combatants in turn order.
    #[must_use]
    pub fn as_slice(&self) -> &[CombatantState] {
        &self.slots
    }

    /// Slot holding `id`.
    #[must_use]
    pub fn slot_of(&self, id: CombatantId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Looks a combatant up by id.
    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&CombatantState> {
        self.slot_of(id).and_then(|slot| self.slots.get(slot))
    }

    /// Mutable lookup by id.
    #[must_use]
    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut CombatantState> {
        let slot = self.slot_of(id)?;
        self.slots.get_mut(slot)
    }

    /// Combatant in `slot`.
    #[must_use]
    pub fn at(&self, slot: usize) -> Option<&CombatantState> {
        self.slots.get(slot)
    }

    /// Whether `team` still has anyone standing.
    #[must_use]
    pub fn has_living(&self, team: Team) -> bool {
        self.slots
            .iter()
            .any(|state| state.team() == team && state.is_alive())
    }

    /// Living members of `team`, in turn order.
    pub fn living(&self, team: Team) -> impl Iterator<Item = &CombatantState> + '_ {
        self.slots
            .iter()
            .filter(move |state| state.team() == team && state.is_alive())
    }

    /// Combatant ids in turn order.
    pub fn ids(&self) -> impl Iterator<Item = CombatantId> + '_ {
        self.slots.iter().map(CombatantState::id)
    }
}
