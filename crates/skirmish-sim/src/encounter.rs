//! JSON encounter files.
//!
//! An encounter names a combat config, a pool of ability templates, and the
//! two parties. Combatants refer to abilities by id.
//!
//! ```json
//! {
//!   "config": { "seed": 7 },
//!   "abilities": [
//!     { "id": "slash", "name": "Slash", "power": 12.0 }
//!   ],
//!   "players": [
//!     { "id": 1, "name": "Knight", "max_health": 40.0, "abilities": ["slash"] }
//!   ],
//!   "enemies": [
//!     { "id": 2, "name": "Wolf", "max_health": 20.0, "abilities": ["slash"] }
//!   ],
//!   "seconds_per_turn": 1.0,
//!   "max_rounds": 200
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use skirmish_core::ability::{Ability, AbilityId};
use skirmish_core::combatant::{CombatantId, CombatantState, ResourceKind, Resistances, Team};
use skirmish_core::config::CombatConfig;
use skirmish_core::session::Entrant;

/// One combatant in an encounter file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantSpec {
    /// Unique id within the encounter.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Starting and maximum health.
    pub max_health: f32,
    /// Starting and maximum resource.
    #[serde(default)]
    pub max_resource: f32,
    /// Resource label.
    #[serde(default)]
    pub resource_kind: ResourceKind,
    /// Attack stat.
    #[serde(default)]
    pub attack: f32,
    /// Resistance per damage type.
    #[serde(default)]
    pub resistances: Resistances,
    /// Ability ids from the encounter's template pool.
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
}

impl CombatantSpec {
    fn state(&self, team: Team) -> CombatantState {
        CombatantState::new(
            CombatantId::new(self.id),
            &self.name,
            team,
            self.max_health,
            self.max_resource,
        )
        .with_resource_kind(self.resource_kind)
        .with_attack(self.attack)
        .with_resistances(self.resistances.clone())
    }
}

/// A complete encounter definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encounter {
    /// Engine configuration. Its seed is the default for single runs.
    #[serde(default)]
    pub config: CombatConfig,
    /// Ability templates shared by every combatant.
    #[serde(default)]
    pub abilities: Vec<Ability>,
    /// Player party in turn order.
    pub players: Vec<CombatantSpec>,
    /// Enemy party in turn order.
    pub enemies: Vec<CombatantSpec>,
    /// Simulated seconds that pass after each player turn.
    #[serde(default = "default_seconds_per_turn")]
    pub seconds_per_turn: f32,
    /// Rounds after which the run is stopped with no winner.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

fn default_seconds_per_turn() -> f32 {
    1.0
}

fn default_max_rounds() -> u32 {
    200
}

impl Encounter {
    /// Reads and validates an encounter file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or does not validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read encounter file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in encounter file {}", path.display()))
    }

    /// Parses and validates an encounter from JSON text.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or an invalid encounter.
    pub fn from_json(text: &str) -> Result<Self> {
        let encounter: Self = serde_json::from_str(text).context("failed to parse encounter JSON")?;
        encounter.validate()?;
        Ok(encounter)
    }

    /// Checks the config, every template, and every ability reference.
    ///
    /// Roster problems (empty parties, duplicate ids) are left to
    /// [`skirmish_core::CombatSession::start`].
    ///
    /// # Errors
    ///
    /// Describes the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.config.validate().context("invalid combat config")?;
        for ability in &self.abilities {
            ability
                .validate()
                .with_context(|| format!("invalid ability template {}", ability.id))?;
        }
        ensure!(
            self.seconds_per_turn.is_finite() && self.seconds_per_turn >= 0.0,
            "seconds_per_turn must be a non-negative number, got {}",
            self.seconds_per_turn
        );
        ensure!(self.max_rounds > 0, "max_rounds must be positive");

        let known = self.templates();
        for spec in self.players.iter().chain(&self.enemies) {
            for id in &spec.abilities {
                ensure!(
                    known.contains_key(id),
                    "combatant {} ({}) uses unknown ability {}",
                    spec.id,
                    spec.name,
                    id
                );
            }
        }
        Ok(())
    }

    /// Builds fresh entrants for both parties.
    ///
    /// Templates are shared between combatants through `Arc`.
    ///
    /// # Errors
    ///
    /// Fails if a combatant refers to an ability that is not in the pool.
    pub fn entrants(&self) -> Result<(Vec<Entrant>, Vec<Entrant>)> {
        let templates = self.templates();
        let build = |specs: &[CombatantSpec], team: Team| -> Result<Vec<Entrant>> {
            specs
                .iter()
                .map(|spec| {
                    let abilities = spec
                        .abilities
                        .iter()
                        .map(|id| {
                            templates
                                .get(id)
                                .map(Arc::clone)
                                .with_context(|| format!("unknown ability {id}"))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok(Entrant::new(spec.state(team)).with_abilities(abilities))
                })
                .collect()
        };
        Ok((build(&self.players, Team::Player)?, build(&self.enemies, Team::Enemy)?))
    }

    fn templates(&self) -> BTreeMap<&AbilityId, Arc<Ability>> {
        let mut templates = BTreeMap::new();
        for ability in &self.abilities {
            templates
                .entry(&ability.id)
                .or_insert_with(|| Arc::new(ability.clone()));
        }
        templates
    }
}
