//! Per-combatant ability loadouts with live cooldowns.
//!
//! The [`AbilityRegistry`] is the gatekeeper between "an actor wants to use
//! an ability" and the [`DamageResolver`]. It owns every cooldown; ability
//! templates themselves stay immutable and shared.
//!
//! # Gates
//!
//! [`AbilityRegistry::try_use`] checks, in order:
//! 1. the actor owns the ability ([`Decline::UnknownAbility`])
//! 2. its cooldown is at 0 ([`Decline::OnCooldown`])
//! 3. the actor can pay for it ([`Decline::InsufficientResource`])
//!
//! Any failure leaves resources and cooldowns untouched. On success the cost
//! is spent, the ability resolves, and the cooldown starts, all within the
//! same call.
//!
//! # Time
//!
//! Cooldowns are seconds. [`AbilityRegistry::tick`] runs them down for every
//! combatant at once, whoever's turn it is. Remaining time is kept in `f64`,
//! like the [`tempo`] clock, and an ability is ready only once the ticks add
//! up to its full cooldown.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::ability::{Ability, AbilityError, AbilityId};
use crate::combatant::CombatantId;
use crate::combo::ComboTracker;
use crate::error::{Decline, SessionError};
use crate::resolver::{DamageResolver, Resolution, Strike};
use crate::roster::Roster;

/// One ability in a loadout and its cooldown.
#[derive(Debug, Clone)]
pub struct AbilitySlot {
    ability: Arc<Ability>,
    cooldown_remaining: f64,
}

impl AbilitySlot {
    /// Template.
    #[must_use]
    pub fn ability(&self) -> &Arc<Ability> {
        &self.ability
    }

    /// Seconds until the ability is ready again.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining as f32
    }

    /// Returns true when the cooldown is at 0.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }

    fn decay(&mut self, dt: f64) {
        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
        }
    }
}

/// Abilities one combatant can use, in the order they were given.
#[derive(Debug, Clone, Default)]
pub struct Loadout {
    slots: Vec<AbilitySlot>,
}

impl Loadout {
    /// Slot for `id`.
    #[must_use]
    pub fn get(&self, id: &AbilityId) -> Option<&AbilitySlot> {
        self.slots.iter().find(|slot| &slot.ability.id == id)
    }

    fn get_mut(&mut self, id: &AbilityId) -> Option<&mut AbilitySlot> {
        self.slots.iter_mut().find(|slot| &slot.ability.id == id)
    }

    /// All slots.
    pub fn iter(&self) -> impl Iterator<Item = &AbilitySlot> + '_ {
        self.slots.iter()
    }

    /// Abilities off cooldown that cost at most `resource`.
    pub fn usable(&self, resource: f32) -> impl Iterator<Item = &Arc<Ability>> + '_ {
        self.slots
            .iter()
            .filter(move |slot| slot.is_ready() && slot.ability.resource_cost <= resource)
            .map(|slot| &slot.ability)
    }

    /// Number of abilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true for an empty loadout.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Loadouts and cooldowns for every combatant in a session.
#[derive(Debug, Clone, Default)]
pub struct AbilityRegistry {
    loadouts: BTreeMap<CombatantId, Loadout>,
}

impl AbilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `actor`'s loadout with every cooldown at 0.
    ///
    /// A repeated ability id keeps its first occurrence. Seeding the same
    /// actor again replaces its loadout.
    ///
    /// # Errors
    ///
    /// Returns the first template that fails [`Ability::validate`]; the
    /// registry is unchanged in that case.
    pub fn seed(
        &mut self,
        actor: CombatantId,
        abilities: impl IntoIterator<Item = Arc<Ability>>,
    ) -> Result<(), AbilityError> {
        let mut slots: Vec<AbilitySlot> = Vec::new();
        for ability in abilities {
            ability.validate()?;
            if slots.iter().any(|slot| slot.ability.id == ability.id) {
                continue;
            }
            slots.push(AbilitySlot {
                ability,
                cooldown_remaining: 0.0,
            });
        }
        self.loadouts.insert(actor, Loadout { slots });
        Ok(())
    }

    /// `actor`'s loadout.
    #[must_use]
    pub fn loadout(&self, actor: CombatantId) -> Option<&Loadout> {
        self.loadouts.get(&actor)
    }

    /// Seconds until `actor` may use `ability` again.
    ///
    /// `None` if the actor does not own the ability.
    #[must_use]
    pub fn cooldown_remaining(&self, actor: CombatantId, ability: &AbilityId) -> Option<f32> {
        self.loadout(actor)
            .and_then(|loadout| loadout.get(ability))
            .map(AbilitySlot::cooldown_remaining)
    }

    /// Runs every cooldown down by `dt` seconds, flooring at 0.
    ///
    /// `dt` must already be validated as finite and non-negative.
    pub fn tick(&mut self, dt: f32) {
        let dt = f64::from(dt);
        for loadout in self.loadouts.values_mut() {
            for slot in &mut loadout.slots {
                slot.decay(dt);
            }
        }
    }

    /// Runs the ownership, cooldown and resource gates without changing
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns the [`Decline`] for the first gate that fails.
    pub fn check(
        &self,
        actor: CombatantId,
        ability: &AbilityId,
        available: f32,
    ) -> Result<&Arc<Ability>, Decline> {
        let slot = self
            .loadout(actor)
            .and_then(|loadout| loadout.get(ability))
            .ok_or_else(|| Decline::UnknownAbility {
                actor,
                ability: ability.clone(),
            })?;
        if !slot.is_ready() {
            return Err(Decline::OnCooldown {
                ability: ability.clone(),
                remaining: slot.cooldown_remaining(),
            });
        }
        let needed = slot.ability.resource_cost;
        if available < needed {
            return Err(Decline::InsufficientResource { needed, available });
        }
        Ok(&slot.ability)
    }

    /// Uses `ability` from `actor` on `target`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::UnknownCombatant`] if either id is not in `roster`
    /// - [`SessionError::Declined`] if a gate fails
    ///
    /// Nothing changes on error.
    pub fn try_use(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        ability: &AbilityId,
        roster: &mut Roster,
        resolver: &mut DamageResolver,
        combos: &mut ComboTracker,
    ) -> Result<Resolution, SessionError> {
        let caster = roster
            .get(actor)
            .ok_or(SessionError::UnknownCombatant(actor))?;
        if roster.get(target).is_none() {
            return Err(SessionError::UnknownCombatant(target));
        }
        let strike = Strike::from_caster(caster);
        let template = Arc::clone(self.check(actor, ability, caster.resource().current())?);

        let paid = roster
            .get_mut(actor)
            .is_some_and(|state| state.spend_resource(template.resource_cost));
        if !paid {
            let available = roster.get(actor).map_or(0.0, |s| s.resource().current());
            return Err(Decline::InsufficientResource {
                needed: template.resource_cost,
                available,
            }
            .into());
        }

        let target_state = roster
            .get_mut(target)
            .ok_or(SessionError::UnknownCombatant(target))?;
        let resolution = resolver.resolve(strike, target_state, &template, combos);

        if let Some(slot) = self
            .loadouts
            .get_mut(&actor)
            .and_then(|loadout| loadout.get_mut(ability))
        {
            slot.cooldown_remaining = f64::from(template.cooldown);
        }
        debug!(%actor, ability = %template.id, cooldown = template.cooldown, "cooldown started");
        Ok(resolution)
    }
}
