//! Value components carried by a combatant.
//!
//! - [`Pool`]: a capped resource (health, mana, rage)
//! - [`Resistances`]: per-damage-type mitigation values
//! - [`ResourceKind`]: what a combatant's spendable pool represents

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ability::DamageType;

/// What a combatant's spendable resource pool represents.
///
/// The engine treats every kind the same way; the label exists for UI and
/// content collaborators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Casters.
    #[default]
    Mana,
    /// Warriors.
    Rage,
    /// Rogues.
    Energy,
}

/// A capped value in `[0, max]`.
///
/// # Example
///
/// ```
/// use skirmish_core::combatant::Pool;
///
/// let mut mana = Pool::full(50.0);
/// assert!(mana.spend(20.0));
/// assert!(!mana.spend(40.0)); // not enough, nothing spent
/// assert_eq!(mana.current(), 30.0);
/// mana.restore(100.0);
/// assert_eq!(mana.current(), 50.0);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPool")]
pub struct Pool {
    current: f32,
    max: f32,
}

/// Unchecked wire form of a [`Pool`], clamped on the way in.
#[derive(Deserialize)]
struct RawPool {
    current: f32,
    max: f32,
}

impl From<RawPool> for Pool {
    fn from(raw: RawPool) -> Self {
        Self::new(raw.current, raw.max)
    }
}

impl Pool {
    /// A pool filled to `max`. Negative or non-finite maxima become 0.
    #[must_use]
    pub fn full(max: f32) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        Self { current: max, max }
    }

    /// A pool holding `current`, clamped into `[0, max]`. NaN reads as 0.
    #[must_use]
    pub fn new(current: f32, max: f32) -> Self {
        let mut pool = Self::full(max);
        pool.current = current.max(0.0).min(pool.max);
        pool
    }

    /// Current value.
    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Upper bound.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Returns true at zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    /// Removes `amount` if the pool holds at least that much.
    ///
    /// Returns `false`, leaving the pool untouched, when it does not.
    pub fn spend(&mut self, amount: f32) -> bool {
        if amount > self.current {
            return false;
        }
        self.current = (self.current - amount.max(0.0)).max(0.0);
        true
    }

    /// Removes up to `amount`, flooring at zero. Returns what was removed.
    pub fn drain(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).max(0.0);
        before - self.current
    }

    /// Adds up to `amount`, capping at `max`. Returns what was added.
    pub fn restore(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        self.current - before
    }
}

/// Per-damage-type resistance table.
///
/// Keys are unique; a type with no entry reads as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resistances(BTreeMap<DamageType, f32>);

impl Resistances {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resistance against `damage_type`, 0 if absent.
    #[must_use]
    pub fn get(&self, damage_type: DamageType) -> f32 {
        self.0.get(&damage_type).copied().unwrap_or(0.0)
    }

    /// Sets (or replaces) the resistance for `damage_type`.
    pub fn set(&mut self, damage_type: DamageType, value: f32) {
        self.0.insert(damage_type, value);
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, damage_type: DamageType, value: f32) -> Self {
        self.set(damage_type, value);
        self
    }

    /// Iterates entries in damage-type order.
    pub fn iter(&self) -> impl Iterator<Item = (DamageType, f32)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(DamageType, f32)> for Resistances {
    fn from_iter<T: IntoIterator<Item = (DamageType, f32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
