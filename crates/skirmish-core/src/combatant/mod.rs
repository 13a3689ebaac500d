//! Combatant state for a single encounter.
//!
//! This module provides the per-actor data the engine mutates:
//! - [`CombatantId`]: stable identifier, unique within a session
//! - [`Team`]: side tag, which also decides who controls the combatant
//! - [`CombatantState`]: health and resource pools, attack, resistances
//!
//! # Lifecycle
//!
//! A combatant is created when it enters a session and is only mutated by
//! damage and heal operations routed through the engine. Defeated
//! combatants stay in the roster at zero health so turn-order
//! bookkeeping never shifts.
//!
//! # Example
//!
//! ```
//! use skirmish_core::combatant::{CombatantId, CombatantState, Team};
//!
//! let mut goblin = CombatantState::new(CombatantId::new(7), "Goblin", Team::Enemy, 30.0, 0.0);
//! let hit = goblin.apply_damage(45.0);
//!
//! assert_eq!(hit.dealt, 30.0);
//! assert!(hit.killed);
//! assert!(!goblin.is_alive());
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{Pool, ResourceKind, Resistances};

/// Unique identifier for a combatant.
///
/// Identifiers are supplied by the content layer and must be unique within a
/// session. Ordering follows the numeric value.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(u64);

impl CombatantId {
    /// Creates a new `CombatantId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombatantId({})", self.0)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CombatantId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Side a combatant fights for.
///
/// `Player` combatants are controlled externally: the turn loop suspends on
/// their turns until an action is submitted. Every other team is driven by
/// the AI collaborator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Externally controlled party.
    Player,
    /// AI-controlled opposition.
    Enemy,
}

impl Team {
    /// Whether the turn loop waits for an external action on this team's turns.
    #[must_use]
    pub const fn is_player_controlled(self) -> bool {
        matches!(self, Self::Player)
    }

    /// The opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
        }
    }
}

/// Outcome of [`CombatantState::apply_damage`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageTaken {
    /// Health actually removed (never more than the health that was left).
    pub dealt: f32,
    /// True if this hit took the combatant from alive to defeated.
    pub killed: bool,
}

/// Mutable per-actor combat state.
///
/// # Invariants
///
/// - `health` and `resource` stay within `[0, max]`, deserialized ones too
/// - alive exactly while `health > 0`; a defeated combatant cannot be
///   healed, so defeat is final
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantState {
    id: CombatantId,
    name: String,
    team: Team,
    health: Pool,
    resource: Pool,
    #[serde(default)]
    resource_kind: ResourceKind,
    #[serde(default)]
    attack: f32,
    #[serde(default)]
    resistances: Resistances,
}

impl CombatantState {
    /// Creates a combatant at full health and resource.
    ///
    /// A combatant created with `max_health <= 0` starts defeated.
    #[must_use]
    pub fn new(id: CombatantId, name: &str, team: Team, max_health: f32, max_resource: f32) -> Self {
        let health = Pool::full(max_health);
        Self {
            id,
            name: name.to_string(),
            team,
            health,
            resource: Pool::full(max_resource),
            resource_kind: ResourceKind::default(),
            attack: 0.0,
            resistances: Resistances::new(),
        }
    }

    /// Sets the attack stat.
    #[must_use]
    pub fn with_attack(mut self, attack: f32) -> Self {
        self.attack = attack;
        self
    }

    /// Replaces the resistance table.
    #[must_use]
    pub fn with_resistances(mut self, resistances: Resistances) -> Self {
        self.resistances = resistances;
        self
    }

    /// Labels the resource pool.
    #[must_use]
    pub fn with_resource_kind(mut self, kind: ResourceKind) -> Self {
        self.resource_kind = kind;
        self
    }

    /// Starts the combatant below full health. Zero health means defeated.
    #[must_use]
    pub fn with_health(mut self, current: f32) -> Self {
        self.health = Pool::new(current, self.health.max());
        self
    }

    /// Starts the combatant below full resource.
    #[must_use]
    pub fn with_resource(mut self, current: f32) -> Self {
        self.resource = Pool::new(current, self.resource.max());
        self
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> CombatantId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Team tag.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Health pool.
    #[must_use]
    pub const fn health(&self) -> &Pool {
        &self.health
    }

    /// Spendable resource pool.
    #[must_use]
    pub const fn resource(&self) -> &Pool {
        &self.resource
    }

    /// What the resource pool represents.
    #[must_use]
    pub const fn resource_kind(&self) -> ResourceKind {
        self.resource_kind
    }

    /// Attack stat.
    #[must_use]
    pub const fn attack(&self) -> f32 {
        self.attack
    }

    /// Resistance table.
    #[must_use]
    pub const fn resistances(&self) -> &Resistances {
        &self.resistances
    }

    /// Whether the combatant can still act and be targeted.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.health.is_empty()
    }

    /// Removes health. Reaching zero defeats the combatant.
    ///
    /// Damage to a defeated combatant is ignored.
    pub fn apply_damage(&mut self, amount: f32) -> DamageTaken {
        if !self.is_alive() {
            return DamageTaken {
                dealt: 0.0,
                killed: false,
            };
        }
        let dealt = self.health.drain(amount);
        let killed = self.health.is_empty();
        DamageTaken { dealt, killed }
    }

    /// Restores health up to the maximum. Returns the amount healed.
    ///
    /// Defeated combatants cannot be healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() {
            return 0.0;
        }
        self.health.restore(amount)
    }

    /// Spends resource if enough is available.
    pub(crate) fn spend_resource(&mut self, cost: f32) -> bool {
        self.resource.spend(cost)
    }
}
