//! Factories for combatants, abilities and sessions.

use std::sync::Arc;

use crate::ability::{Ability, AbilityId};
use crate::ai::{AggressiveAi, AiController, Decision, TurnView};
use crate::combatant::{CombatantId, CombatantState, Team};
use crate::config::CombatConfig;
use crate::event::CombatEvent;
use crate::session::{CombatSession, Entrant, Phase};

// =============================================================================
// Combatants
// =============================================================================

/// A player with `health` and `resource`, no attack stat.
pub fn player(id: u64, health: f32, resource: f32) -> CombatantState {
    CombatantState::new(CombatantId::new(id), &format!("Player{id}"), Team::Player, health, resource)
}

/// An enemy with `health` and no resource.
pub fn enemy(id: u64, health: f32) -> CombatantState {
    CombatantState::new(CombatantId::new(id), &format!("Enemy{id}"), Team::Enemy, health, 0.0)
}

// =============================================================================
// Abilities
// =============================================================================

/// Free, instant, physical damage.
pub fn strike(id: &str, power: f32) -> Arc<Ability> {
    Arc::new(Ability::new(id, id, power))
}

/// Damage with a cost and a cooldown.
pub fn spell(id: &str, power: f32, cost: f32, cooldown: f32) -> Arc<Ability> {
    Arc::new(
        Ability::new(id, id, power)
            .with_cost(cost)
            .with_cooldown(cooldown),
    )
}

/// Shorthand for an ability id.
pub fn ability(id: &str) -> AbilityId {
    AbilityId::new(id)
}

// =============================================================================
// Sessions
// =============================================================================

/// An AI that never acts.
pub fn idle_ai(_view: &TurnView<'_>) -> Option<Decision> {
    None
}

/// Session with the default config and the given controller.
pub fn session_with<A: AiController + 'static>(seed: u64, ai: A) -> CombatSession {
    CombatSession::new(CombatConfig::with_seed(seed), ai).unwrap()
}

/// Session with [`AggressiveAi`].
pub fn aggressive_session(seed: u64) -> CombatSession {
    session_with(seed, AggressiveAi::new())
}

/// Entrant carrying `abilities`.
pub fn entrant(state: CombatantState, abilities: &[Arc<Ability>]) -> Entrant {
    Entrant::new(state).with_abilities(abilities.iter().cloned())
}

// =============================================================================
// Event queries
// =============================================================================

/// Actors of every `TurnStarted` event, in order.
pub fn turn_order(events: &[CombatEvent]) -> Vec<CombatantId> {
    events
        .iter()
        .filter_map(|event| match event {
            CombatEvent::TurnStarted { actor, .. } => Some(*actor),
            _ => None,
        })
        .collect()
}

/// Combatants reported defeated, in order.
pub fn defeated(events: &[CombatEvent]) -> Vec<CombatantId> {
    events
        .iter()
        .filter_map(|event| match event {
            CombatEvent::CombatantDefeated { actor } => Some(*actor),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Autopilot
// =============================================================================

/// Plays every player turn with [`AggressiveAi`], passing when it has nothing
/// to do, and ticks `dt` seconds after each turn. Stops when the encounter
/// ends or after `max_turns` player turns.
///
/// Returns the number of player turns taken.
pub fn autopilot(session: &mut CombatSession, dt: f32, max_turns: usize) -> usize {
    let mut pilot = AggressiveAi::new();
    let mut turns = 0;
    while let Phase::AwaitingAction(actor) = session.phase() {
        if turns == max_turns {
            break;
        }
        let decision = {
            let view = TurnView {
                actor: session.combatant(actor).unwrap(),
                roster: session.roster(),
                loadout: session.loadout(actor).unwrap(),
                round: session.round(),
            };
            pilot.decide_action(&view)
        };
        match decision {
            Some(d) => {
                session.submit_action(actor, d.target, &d.ability).unwrap();
            }
            None => session.pass_turn(actor).unwrap(),
        }
        session.tick(dt).unwrap();
        turns += 1;
    }
    turns
}
