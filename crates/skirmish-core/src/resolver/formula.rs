//! The damage formula itself, free of randomness and state.

use serde::{Deserialize, Serialize};

/// How a target's resistance mitigates incoming damage.
///
/// Selected once per session in [`CombatConfig`](crate::config::CombatConfig);
/// abilities do not pick their own formula.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageFormula {
    /// `max(0, base - resistance)`.
    #[default]
    FlatReduction,
    /// `base * (1 - resistance / 100)`, resistance read as a percentage.
    PercentageReduction,
}

impl DamageFormula {
    /// Applies the target's resistance to `base`.
    ///
    /// Percentage resistance above 100 yields a negative value here; the
    /// final clamp in [`compute`] takes care of it.
    #[must_use]
    pub fn mitigate(self, base: f32, resistance: f32) -> f32 {
        match self {
            Self::FlatReduction => (base - resistance).max(0.0),
            Self::PercentageReduction => base * (1.0 - resistance / 100.0),
        }
    }
}

/// Everything the formula reads for one hit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DamageInputs {
    /// Ability power.
    pub power: f32,
    /// Caster attack stat.
    pub attack: f32,
    /// Weight of `attack` in base damage.
    pub attack_scaling: f32,
    /// Target resistance to the ability's damage type.
    pub resistance: f32,
    /// Ability crit chance in `[0, 1]`.
    pub crit_chance: f32,
    /// Ability crit multiplier.
    pub crit_multiplier: f32,
    /// Caster's combo multiplier for this hit.
    pub combo_multiplier: f32,
}

/// Intermediate and final values of one damage computation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageBreakdown {
    /// `power + attack * attack_scaling`.
    pub base: f32,
    /// Base after resistance.
    pub mitigated: f32,
    /// Whether the roll landed a critical hit.
    pub was_crit: bool,
    /// Crit multiplier actually applied (1.0 without a crit).
    pub crit_multiplier: f32,
    /// Combo multiplier applied.
    pub combo_multiplier: f32,
    /// Final damage, never negative.
    pub amount: f32,
}

/// Computes the damage for one hit given a uniform `roll` in `[0, 1)`.
///
/// A hit is critical when `roll < crit_chance`, so a chance of 0 never crits
/// and a chance of 1 always does.
///
/// ```
/// use skirmish_core::resolver::{compute, DamageFormula, DamageInputs};
///
/// let inputs = DamageInputs {
///     power: 20.0,
///     attack: 5.0,
///     attack_scaling: 1.0,
///     resistance: 10.0,
///     crit_chance: 0.5,
///     crit_multiplier: 2.0,
///     combo_multiplier: 1.1,
/// };
///
/// let plain = compute(DamageFormula::FlatReduction, &inputs, 0.9);
/// assert!(!plain.was_crit);
/// assert!((plain.amount - 16.5).abs() < 1e-4);
///
/// let crit = compute(DamageFormula::FlatReduction, &inputs, 0.1);
/// assert!(crit.was_crit);
/// assert!((crit.amount - 33.0).abs() < 1e-4);
/// ```
#[must_use]
pub fn compute(formula: DamageFormula, inputs: &DamageInputs, roll: f32) -> DamageBreakdown {
    let base = inputs.power + inputs.attack * inputs.attack_scaling;
    let mitigated = formula.mitigate(base, inputs.resistance);
    let was_crit = roll < inputs.crit_chance;
    let crit_multiplier = if was_crit { inputs.crit_multiplier } else { 1.0 };
    // f32::max drops NaN in favour of 0.
    let amount = (mitigated * crit_multiplier * inputs.combo_multiplier).max(0.0);
    DamageBreakdown {
        base,
        mitigated,
        was_crit,
        crit_multiplier,
        combo_multiplier: inputs.combo_multiplier,
        amount,
    }
}
