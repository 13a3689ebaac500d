//! Damage and heal resolution.
//!
//! The [`DamageResolver`] turns "caster uses ability on target" into a
//! health change:
//! 1. Register the hit with the caster's combo and read its multiplier
//! 2. Roll for a critical hit on the session's seeded RNG
//! 3. Run [`compute`] with the configured [`DamageFormula`]
//! 4. Apply the result to the target, reporting a defeat
//!
//! The arithmetic lives in [`compute`], which takes the roll as an argument
//! and is therefore pure. The resolver only adds the RNG and the writes.
//!
//! # Combo ordering
//!
//! The hit being resolved counts toward the combo before the multiplier is
//! read. A caster's first hit uses 1.0, its second consecutive hit uses the
//! first table entry, and so on.
//!
//! # Heals
//!
//! [`Effect::Heal`] abilities skip resistances and never touch the combo.
//! They can still crit.

mod formula;

pub use formula::{compute, DamageBreakdown, DamageFormula, DamageInputs};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ability::{Ability, AbilityId, Effect};
use crate::combatant::{CombatantId, CombatantState};
use crate::combo::{ComboTracker, ComboUpdate};
use crate::config::CombatConfig;

/// The caster's side of a resolution, copied out of the roster so the
/// target can be borrowed mutably.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Strike {
    /// Who is acting.
    pub caster: CombatantId,
    /// Caster attack stat.
    pub attack: f32,
}

impl Strike {
    /// Captures the caster's side from its state.
    #[must_use]
    pub fn from_caster(caster: &CombatantState) -> Self {
        Self {
            caster: caster.id(),
            attack: caster.attack(),
        }
    }
}

/// Outcome of one successful ability use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Caster.
    pub actor: CombatantId,
    /// Target.
    pub target: CombatantId,
    /// Ability used.
    pub ability: AbilityId,
    /// Whether the ability damaged or healed.
    pub effect: Effect,
    /// Computed amount before health clamping.
    pub amount: f32,
    /// Health actually removed or restored.
    pub applied: f32,
    /// Whether the hit was critical.
    pub was_crit: bool,
    /// True if this resolution defeated the target.
    pub killed: bool,
    /// Caster combo after the hit. `None` for heals.
    pub combo: Option<ComboUpdate>,
}

/// Applies abilities to targets.
#[derive(Debug, Clone)]
pub struct DamageResolver {
    formula: DamageFormula,
    attack_scaling: f32,
    rng: ChaCha8Rng,
}

impl DamageResolver {
    /// Creates a resolver using the config's formula, scaling and seed.
    #[must_use]
    pub fn new(config: &CombatConfig) -> Self {
        Self {
            formula: config.damage_formula,
            attack_scaling: config.attack_scaling,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// Formula in use.
    #[must_use]
    pub const fn formula(&self) -> DamageFormula {
        self.formula
    }

    /// Resolves `ability` from `strike` against `target`.
    ///
    /// The caller has already cleared every gate (turn, cooldown, resource,
    /// living target).
    pub fn resolve(
        &mut self,
        strike: Strike,
        target: &mut CombatantState,
        ability: &Ability,
        combos: &mut ComboTracker,
    ) -> Resolution {
        match ability.effect {
            Effect::Damage => self.resolve_damage(strike, target, ability, combos),
            Effect::Heal => self.resolve_heal(strike, target, ability),
        }
    }

    fn roll(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    fn resolve_damage(
        &mut self,
        strike: Strike,
        target: &mut CombatantState,
        ability: &Ability,
        combos: &mut ComboTracker,
    ) -> Resolution {
        let combo = combos.register_hit(strike.caster);
        let inputs = DamageInputs {
            power: ability.power,
            attack: strike.attack,
            attack_scaling: self.attack_scaling,
            resistance: target.resistances().get(ability.damage_type),
            crit_chance: ability.crit_chance,
            crit_multiplier: ability.crit_multiplier,
            combo_multiplier: combo.multiplier,
        };
        let roll = self.roll();
        let breakdown = compute(self.formula, &inputs, roll);
        let taken = target.apply_damage(breakdown.amount);

        debug!(
            caster = %strike.caster,
            target = %target.id(),
            ability = %ability.id,
            amount = breakdown.amount,
            dealt = taken.dealt,
            crit = breakdown.was_crit,
            combo = combo.hit_count,
            "damage resolved"
        );

        Resolution {
            actor: strike.caster,
            target: target.id(),
            ability: ability.id.clone(),
            effect: Effect::Damage,
            amount: breakdown.amount,
            applied: taken.dealt,
            was_crit: breakdown.was_crit,
            killed: taken.killed,
            combo: Some(combo),
        }
    }

    fn resolve_heal(
        &mut self,
        strike: Strike,
        target: &mut CombatantState,
        ability: &Ability,
    ) -> Resolution {
        let base = ability.power + strike.attack * self.attack_scaling;
        let was_crit = self.roll() < ability.crit_chance;
        let crit = if was_crit { ability.crit_multiplier } else { 1.0 };
        let amount = (base * crit).max(0.0);
        let healed = target.heal(amount);

        debug!(
            caster = %strike.caster,
            target = %target.id(),
            ability = %ability.id,
            amount,
            healed,
            crit = was_crit,
            "heal resolved"
        );

        Resolution {
            actor: strike.caster,
            target: target.id(),
            ability: ability.id.clone(),
            effect: Effect::Heal,
            amount,
            applied: healed,
            was_crit,
            killed: false,
            combo: None,
        }
    }
}
