//! Engine configuration.
//!
//! [`CombatConfig`] selects the damage formula, the combo window and
//! multiplier table, and the seed for critical-hit rolls. Every field has a
//! default so content files only need to mention what they change.
//!
//! ```
//! use skirmish_core::config::CombatConfig;
//! use skirmish_core::resolver::DamageFormula;
//!
//! let config: CombatConfig = serde_json::from_str(r#"{
//!     "damage_formula": "PercentageReduction",
//!     "combo": { "reset_window": 3.0 }
//! }"#).unwrap();
//!
//! assert_eq!(config.damage_formula, DamageFormula::PercentageReduction);
//! assert_eq!(config.combo.damage_multipliers, vec![1.1, 1.25, 1.5, 2.0]);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::resolver::DamageFormula;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The combo window must be a finite, positive number of seconds.
    #[error("combo reset window must be finite and > 0 (got {0})")]
    InvalidResetWindow(f32),
    /// The multiplier table needs at least one entry.
    #[error("combo damage multiplier table is empty")]
    EmptyMultiplierTable,
    /// A multiplier entry is negative or not finite.
    #[error("combo damage multiplier at index {index} must be finite and >= 0 (got {value})")]
    InvalidMultiplier {
        /// Position in the table.
        index: usize,
        /// Rejected value.
        value: f32,
    },
    /// Attack scaling must be a finite value >= 0.
    #[error("attack scaling must be finite and >= 0 (got {0})")]
    InvalidAttackScaling(f32),
}

/// Combo tracking parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// Seconds after a hit during which the next hit extends the combo.
    pub reset_window: f32,
    /// Multiplier for the 2nd, 3rd, ... hit. The last entry applies to every
    /// hit beyond the table. Non-decreasing tables are expected but not
    /// enforced.
    pub damage_multipliers: Vec<f32>,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            reset_window: 2.0,
            damage_multipliers: vec![1.1, 1.25, 1.5, 2.0],
        }
    }
}

impl ComboConfig {
    /// Checks the window and the multiplier table.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.reset_window.is_finite() || self.reset_window <= 0.0 {
            return Err(ConfigError::InvalidResetWindow(self.reset_window));
        }
        if self.damage_multipliers.is_empty() {
            return Err(ConfigError::EmptyMultiplierTable);
        }
        if let Some((index, value)) = self
            .damage_multipliers
            .iter()
            .enumerate()
            .find(|(_, m)| !m.is_finite() || **m < 0.0)
        {
            return Err(ConfigError::InvalidMultiplier {
                index,
                value: *value,
            });
        }
        Ok(())
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// How resistances mitigate damage.
    pub damage_formula: DamageFormula,
    /// Weight of the caster's attack stat in base damage.
    pub attack_scaling: f32,
    /// Combo window and multipliers.
    pub combo: ComboConfig,
    /// Seed for critical-hit rolls. Same seed, same inputs, same fight.
    pub seed: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            damage_formula: DamageFormula::FlatReduction,
            attack_scaling: 1.0,
            combo: ComboConfig::default(),
            seed: 0,
        }
    }
}

impl CombatConfig {
    /// Default configuration with a specific seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.attack_scaling.is_finite() || self.attack_scaling < 0.0 {
            return Err(ConfigError::InvalidAttackScaling(self.attack_scaling));
        }
        self.combo.validate()
    }
}
