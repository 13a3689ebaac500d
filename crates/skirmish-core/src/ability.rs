//! Ability templates.
//!
//! An [`Ability`] is an immutable, data-driven description of a combat
//! action. Templates are loaded by content collaborators and shared by
//! reference (`Arc<Ability>`) across every combatant that can use them.
//! Per-combatant cooldown state lives in the
//! [`AbilityRegistry`](crate::registry::AbilityRegistry), never here.
//!
//! # Example
//!
//! ```
//! use skirmish_core::ability::{Ability, DamageType};
//!
//! let fireball = Ability::new("fireball", "Fireball", 30.0)
//!     .with_cost(20.0)
//!     .with_cooldown(3.0)
//!     .with_damage_type(DamageType::Fire)
//!     .with_crit(0.1, 2.0);
//!
//! assert!(fireball.validate().is_ok());
//! assert_eq!(fireball.id.as_str(), "fireball");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of damage an ability can deal.
///
/// Each combatant carries a resistance value per damage type; an absent
/// entry means no resistance.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DamageType {
    /// Weapons, fists, claws.
    #[default]
    Physical,
    /// Burning damage.
    Fire,
    /// Frost damage.
    Ice,
    /// Electric damage.
    Lightning,
    /// Raw magical damage.
    Arcane,
    /// Radiant damage.
    Holy,
    /// Dark magic.
    Shadow,
    /// Damage from the void.
    Void,
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Physical => "Physical",
            Self::Fire => "Fire",
            Self::Ice => "Ice",
            Self::Lightning => "Lightning",
            Self::Arcane => "Arcane",
            Self::Holy => "Holy",
            Self::Shadow => "Shadow",
            Self::Void => "Void",
        };
        f.write_str(name)
    }
}

/// What an ability does to its target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Effect {
    /// Deals damage, mitigated by the target's resistances.
    #[default]
    Damage,
    /// Restores health to a living target.
    Heal,
}

/// Stable identifier of an ability template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityId(String);

impl AbilityId {
    /// Creates an identifier from a string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AbilityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AbilityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Reasons an ability template is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AbilityError {
    /// `resource_cost` is negative or not finite.
    #[error("ability {id}: resource cost must be a finite value >= 0 (got {value})")]
    InvalidCost {
        /// Offending ability.
        id: AbilityId,
        /// Rejected value.
        value: f32,
    },
    /// `cooldown` is negative or not finite.
    #[error("ability {id}: cooldown must be a finite value >= 0 (got {value})")]
    InvalidCooldown {
        /// Offending ability.
        id: AbilityId,
        /// Rejected value.
        value: f32,
    },
    /// `power` is not finite.
    #[error("ability {id}: power must be finite (got {value})")]
    InvalidPower {
        /// Offending ability.
        id: AbilityId,
        /// Rejected value.
        value: f32,
    },
    /// `crit_chance` is outside `[0, 1]`.
    #[error("ability {id}: crit chance must be within [0, 1] (got {value})")]
    InvalidCritChance {
        /// Offending ability.
        id: AbilityId,
        /// Rejected value.
        value: f32,
    },
    /// `crit_multiplier` is below 1 or not finite.
    #[error("ability {id}: crit multiplier must be a finite value >= 1 (got {value})")]
    InvalidCritMultiplier {
        /// Offending ability.
        id: AbilityId,
        /// Rejected value.
        value: f32,
    },
}

/// Immutable ability template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    /// Stable identifier used to look the ability up in a loadout.
    pub id: AbilityId,
    /// Display name.
    pub name: String,
    /// Resource spent on use.
    #[serde(default)]
    pub resource_cost: f32,
    /// Seconds before the same combatant may use it again.
    #[serde(default)]
    pub cooldown: f32,
    /// Base power fed into the damage (or heal) formula.
    pub power: f32,
    /// Probability in `[0, 1]` of a critical hit.
    #[serde(default)]
    pub crit_chance: f32,
    /// Multiplier applied on a critical hit.
    #[serde(default = "default_crit_multiplier")]
    pub crit_multiplier: f32,
    /// Damage type checked against the target's resistances.
    #[serde(default)]
    pub damage_type: DamageType,
    /// Damage or heal.
    #[serde(default)]
    pub effect: Effect,
}

fn default_crit_multiplier() -> f32 {
    2.0
}

impl Ability {
    /// Creates a damaging ability with no cost, no cooldown and no crit chance.
    #[must_use]
    pub fn new(id: &str, name: &str, power: f32) -> Self {
        Self {
            id: AbilityId::new(id),
            name: name.to_string(),
            resource_cost: 0.0,
            cooldown: 0.0,
            power,
            crit_chance: 0.0,
            crit_multiplier: default_crit_multiplier(),
            damage_type: DamageType::Physical,
            effect: Effect::Damage,
        }
    }

    /// Sets the resource cost.
    #[must_use]
    pub fn with_cost(mut self, cost: f32) -> Self {
        self.resource_cost = cost;
        self
    }

    /// Sets the cooldown in seconds.
    #[must_use]
    pub fn with_cooldown(mut self, seconds: f32) -> Self {
        self.cooldown = seconds;
        self
    }

    /// Sets the crit chance and multiplier.
    #[must_use]
    pub fn with_crit(mut self, chance: f32, multiplier: f32) -> Self {
        self.crit_chance = chance;
        self.crit_multiplier = multiplier;
        self
    }

    /// Sets the damage type.
    #[must_use]
    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    /// Turns the ability into a heal.
    #[must_use]
    pub fn healing(mut self) -> Self {
        self.effect = Effect::Heal;
        self
    }

    /// Checks the template's numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns the first [`AbilityError`] found.
    pub fn validate(&self) -> Result<(), AbilityError> {
        let id = || self.id.clone();
        if !self.resource_cost.is_finite() || self.resource_cost < 0.0 {
            return Err(AbilityError::InvalidCost {
                id: id(),
                value: self.resource_cost,
            });
        }
        if !self.cooldown.is_finite() || self.cooldown < 0.0 {
            return Err(AbilityError::InvalidCooldown {
                id: id(),
                value: self.cooldown,
            });
        }
        if !self.power.is_finite() {
            return Err(AbilityError::InvalidPower {
                id: id(),
                value: self.power,
            });
        }
        if !(0.0..=1.0).contains(&self.crit_chance) {
            return Err(AbilityError::InvalidCritChance {
                id: id(),
                value: self.crit_chance,
            });
        }
        if !self.crit_multiplier.is_finite() || self.crit_multiplier < 1.0 {
            return Err(AbilityError::InvalidCritMultiplier {
                id: id(),
                value: self.crit_multiplier,
            });
        }
        Ok(())
    }
}
