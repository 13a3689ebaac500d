//! End-to-end encounters through the public session API.

use std::sync::Arc;

use crate::ability::{Ability, DamageType, Effect};
use crate::ai::{Decision, TurnView};
use crate::combatant::{CombatantId, CombatantState, Resistances, Team};
use crate::config::CombatConfig;
use crate::error::{Decline, SessionError};
use crate::event::CombatEvent;
use crate::resolver::DamageFormula;
use crate::session::{CombatSession, Phase};

use super::helpers::{
    ability, aggressive_session, defeated, enemy, entrant, idle_ai, player, session_with, spell,
    strike, turn_order,
};

const P1: CombatantId = CombatantId::new(1);
const P2: CombatantId = CombatantId::new(2);
const E3: CombatantId = CombatantId::new(3);
const E4: CombatantId = CombatantId::new(4);

// =============================================================================
// End conditions
// =============================================================================

#[test]
fn one_hit_kill_ends_with_player_win() {
    let mut session = aggressive_session(0);
    session
        .start(
            vec![entrant(player(1, 10.0, 0.0), &[strike("smash", 15.0)])],
            vec![entrant(enemy(3, 10.0), &[strike("bite", 1.0)])],
        )
        .unwrap();

    let hit = session.submit_action(P1, E3, &ability("smash")).unwrap();

    let b = session.combatant(E3).unwrap();
    assert_eq!(b.health().current(), 0.0);
    assert!(!b.is_alive());
    assert!(hit.killed);
    assert!(!session.is_active());
    assert_eq!(
        session.phase(),
        Phase::Ended {
            winner: Some(Team::Player)
        }
    );

    let events = session.take_events();
    assert_eq!(defeated(&events), vec![E3]);
    assert_eq!(
        events.last(),
        Some(&CombatEvent::CombatEnded {
            winner: Some(Team::Player)
        })
    );
}

#[test]
fn passive_player_loses_to_enemy() {
    let mut session = aggressive_session(0);
    session
        .start(
            vec![entrant(player(1, 10.0, 0.0), &[])],
            vec![entrant(enemy(3, 50.0), &[strike("claw", 4.0)])],
        )
        .unwrap();

    let mut turns = 0;
    while let Phase::AwaitingAction(actor) = session.phase() {
        session.pass_turn(actor).unwrap();
        turns += 1;
        assert!(turns < 10, "encounter did not end");
    }

    // 4, then 4.4, then 5: the third claw finishes it.
    assert_eq!(turns, 3);
    assert_eq!(
        session.phase(),
        Phase::Ended {
            winner: Some(Team::Enemy)
        }
    );
}

#[test]
fn forced_end_has_no_winner_and_freezes_time() {
    let mut session = aggressive_session(0);
    session
        .start(
            vec![entrant(player(1, 10.0, 0.0), &[spell("bolt", 1.0, 0.0, 5.0)])],
            vec![entrant(enemy(3, 50.0), &[])],
        )
        .unwrap();
    session.submit_action(P1, E3, &ability("bolt")).unwrap();
    session.end_combat();
    session.take_events();

    session.tick(10.0).unwrap();
    assert_eq!(session.cooldown_remaining(P1, &ability("bolt")), Some(5.0));
    assert!(session.take_events().is_empty());
    assert_eq!(session.phase(), Phase::Ended { winner: None });
}

// =============================================================================
// Turn order
// =============================================================================

#[test]
fn defeated_slots_are_skipped() {
    let mut session = session_with(0, idle_ai);
    session
        .start(
            vec![
                entrant(player(1, 100.0, 0.0), &[strike("stab", 10.0)]),
                entrant(player(2, 100.0, 0.0), &[]),
            ],
            vec![entrant(enemy(3, 5.0), &[]), entrant(enemy(4, 100.0), &[])],
        )
        .unwrap();

    session.submit_action(P1, E3, &ability("stab")).unwrap();
    session.pass_turn(P2).unwrap();
    session.pass_turn(P1).unwrap();
    session.pass_turn(P2).unwrap();

    let order = turn_order(&session.take_events());
    assert_eq!(order, vec![P1, P2, E4, P1, P2, E4, P1]);
    assert_eq!(session.round(), 3);
    assert_eq!(session.roster().len(), 4);
}

#[test]
fn deserialized_zero_health_entrant_never_gets_a_turn() {
    let ghost: CombatantState = serde_json::from_str(
        r#"{
            "id": 1, "name": "Ghost", "team": "Player",
            "health": { "current": 0.0, "max": 100.0 },
            "resource": { "current": 0.0, "max": 0.0 },
            "alive": true
        }"#,
    )
    .unwrap();
    assert!(!ghost.is_alive());

    let mut session = session_with(0, idle_ai);
    session
        .start(
            vec![entrant(ghost, &[]), entrant(player(2, 50.0, 0.0), &[])],
            vec![entrant(enemy(3, 50.0), &[])],
        )
        .unwrap();
    assert_eq!(session.phase(), Phase::AwaitingAction(P2));
    assert!(!turn_order(session.events()).contains(&P1));
}

#[test]
fn defeated_target_is_declined() {
    let mut session = session_with(0, idle_ai);
    session
        .start(
            vec![entrant(player(1, 100.0, 0.0), &[strike("stab", 10.0)])],
            vec![entrant(enemy(3, 5.0), &[]), entrant(enemy(4, 100.0), &[])],
        )
        .unwrap();
    session.submit_action(P1, E3, &ability("stab")).unwrap();

    let err = session
        .submit_action(P1, E3, &ability("stab"))
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::Declined(Decline::TargetDefeated { target: E3 })
    );
    assert_eq!(session.phase(), Phase::AwaitingAction(P1));
}

// =============================================================================
// Gates
// =============================================================================

#[test]
fn cooldown_recovers_with_ticks_between_turns() {
    let mut session = session_with(0, idle_ai);
    session
        .start(
            vec![entrant(
                player(1, 100.0, 50.0),
                &[spell("fireball", 10.0, 10.0, 3.0)],
            )],
            vec![entrant(enemy(3, 1000.0), &[])],
        )
        .unwrap();

    session.submit_action(P1, E3, &ability("fireball")).unwrap();
    let err = session
        .submit_action(P1, E3, &ability("fireball"))
        .unwrap_err();
    assert_eq!(
        err.as_decline(),
        Some(&Decline::OnCooldown {
            ability: ability("fireball"),
            remaining: 3.0
        })
    );

    session.tick(2.0).unwrap();
    assert_eq!(
        session.cooldown_remaining(P1, &ability("fireball")),
        Some(1.0)
    );
    assert!(session
        .submit_action(P1, E3, &ability("fireball"))
        .is_err());

    session.tick(1.0).unwrap();
    session.submit_action(P1, E3, &ability("fireball")).unwrap();
    assert_eq!(session.combatant(P1).unwrap().resource().current(), 30.0);
}

#[test]
fn broke_player_can_pass() {
    let mut session = session_with(0, idle_ai);
    session
        .start(
            vec![entrant(
                player(1, 100.0, 50.0).with_resource(5.0),
                &[spell("fireball", 10.0, 10.0, 0.0)],
            )],
            vec![entrant(enemy(3, 100.0), &[])],
        )
        .unwrap();

    let err = session
        .submit_action(P1, E3, &ability("fireball"))
        .unwrap_err();
    assert_eq!(
        err.as_decline(),
        Some(&Decline::InsufficientResource {
            needed: 10.0,
            available: 5.0
        })
    );
    assert_eq!(session.combatant(P1).unwrap().resource().current(), 5.0);

    session.pass_turn(P1).unwrap();
    assert_eq!(session.phase(), Phase::AwaitingAction(P1));
    assert_eq!(session.round(), 2);
}

fn always_nuke(view: &TurnView<'_>) -> Option<Decision> {
    let target = view.opponents().next()?;
    Some(Decision::new(target.id(), "nuke"))
}

#[test]
fn ai_on_cooldown_passes_its_turn() {
    let mut session = session_with(0, always_nuke);
    session
        .start(
            vec![entrant(player(1, 100.0, 0.0), &[])],
            vec![entrant(enemy(3, 100.0), &[spell("nuke", 30.0, 0.0, 10.0)])],
        )
        .unwrap();

    session.pass_turn(P1).unwrap();
    assert_eq!(session.combatant(P1).unwrap().health().current(), 70.0);
    session.take_events();

    session.pass_turn(P1).unwrap();
    let events = session.take_events();
    assert!(events.contains(&CombatEvent::ActionDeclined {
        actor: E3,
        reason: Decline::OnCooldown {
            ability: ability("nuke"),
            remaining: 10.0
        }
    }));
    assert!(events.contains(&CombatEvent::TurnPassed { actor: E3 }));
    assert_eq!(session.combatant(P1).unwrap().health().current(), 70.0);
    assert_eq!(session.phase(), Phase::AwaitingAction(P1));
}

// =============================================================================
// Combos
// =============================================================================

#[test]
fn combo_builds_across_turns_and_lapses_with_time() {
    let mut session = session_with(0, idle_ai);
    session
        .start(
            vec![entrant(player(1, 100.0, 0.0), &[strike("jab", 10.0)])],
            vec![entrant(enemy(3, 1000.0), &[])],
        )
        .unwrap();

    let first = session.submit_action(P1, E3, &ability("jab")).unwrap();
    let second = session.submit_action(P1, E3, &ability("jab")).unwrap();
    assert_eq!(first.amount, 10.0);
    assert!((second.amount - 11.0).abs() < 1e-4);
    assert_eq!(session.combo_hits(P1), 2);
    assert!((session.combo_multiplier(P1) - 1.1).abs() < 1e-6);

    session.tick(2.5).unwrap();
    assert_eq!(session.combo_hits(P1), 0);
    assert_eq!(session.combo_multiplier(P1), 1.0);

    let third = session.submit_action(P1, E3, &ability("jab")).unwrap();
    assert_eq!(third.amount, 10.0);
}

#[test]
fn combo_change_events_follow_hits() {
    let mut session = session_with(0, idle_ai);
    session
        .start(
            vec![entrant(player(1, 100.0, 0.0), &[strike("jab", 10.0)])],
            vec![entrant(enemy(3, 1000.0), &[])],
        )
        .unwrap();
    session.take_events();
    session.submit_action(P1, E3, &ability("jab")).unwrap();

    let events = session.take_events();
    let resolved = events
        .iter()
        .position(|e| matches!(e, CombatEvent::ActionResolved { .. }))
        .unwrap();
    assert_eq!(
        events[resolved + 1],
        CombatEvent::ComboChanged {
            actor: P1,
            hit_count: 1,
            multiplier: 1.0
        }
    );
}

// =============================================================================
// Effects and formulas
// =============================================================================

#[test]
fn heal_restores_ally_without_combo() {
    let mend = Arc::new(Ability::new("mend", "Mend", 20.0).healing());
    let mut session = session_with(0, idle_ai);
    session
        .start(
            vec![
                entrant(player(1, 100.0, 0.0), &[mend]),
                entrant(player(2, 100.0, 0.0).with_health(50.0), &[]),
            ],
            vec![entrant(enemy(3, 100.0), &[])],
        )
        .unwrap();
    session.take_events();

    let out = session.submit_action(P1, P2, &ability("mend")).unwrap();
    assert_eq!(out.effect, Effect::Heal);
    assert_eq!(session.combatant(P2).unwrap().health().current(), 70.0);
    assert_eq!(session.combo_hits(P1), 0);
    assert!(!session
        .take_events()
        .iter()
        .any(|e| matches!(e, CombatEvent::ComboChanged { .. })));
}

#[test]
fn percentage_formula_reads_resistance_as_percent() {
    let config = CombatConfig {
        damage_formula: DamageFormula::PercentageReduction,
        ..CombatConfig::default()
    };
    let mut session = CombatSession::new(config, idle_ai).unwrap();
    let fire = Arc::new(Ability::new("fire", "Fire", 40.0).with_damage_type(DamageType::Fire));
    session
        .start(
            vec![entrant(player(1, 100.0, 0.0), &[fire])],
            vec![entrant(
                enemy(3, 100.0).with_resistances(Resistances::new().with(DamageType::Fire, 50.0)),
                &[],
            )],
        )
        .unwrap();

    session.submit_action(P1, E3, &ability("fire")).unwrap();
    assert_eq!(session.combatant(E3).unwrap().health().current(), 80.0);
}

#[test]
fn roster_snapshot_is_join_order() {
    let mut session = session_with(0, idle_ai);
    session
        .start(
            vec![
                entrant(player(2, 10.0, 0.0), &[]),
                entrant(player(1, 10.0, 0.0), &[]),
            ],
            vec![entrant(enemy(4, 10.0), &[]), entrant(enemy(3, 10.0), &[])],
        )
        .unwrap();
    let ids: Vec<_> = session.roster().iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec![P2, P1, E4, E3]);
    assert_eq!(session.current_actor(), Some(P2));
}
