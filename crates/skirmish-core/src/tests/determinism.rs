//! Determinism verification tests.
//!
//! A session owns its only source of randomness (the crit RNG, seeded from
//! the config) and never reads a clock, so the same seed and the same calls
//! must produce the same event stream.

use std::sync::Arc;

use crate::ability::Ability;
use crate::event::CombatEvent;

use super::helpers::{aggressive_session, autopilot, enemy, entrant, player};

fn lucky_blade() -> Arc<Ability> {
    Arc::new(Ability::new("blade", "Blade", 6.0).with_crit(0.5, 2.5))
}

fn heavy() -> Arc<Ability> {
    Arc::new(
        Ability::new("heavy", "Heavy", 14.0)
            .with_cost(10.0)
            .with_cooldown(2.0)
            .with_crit(0.25, 2.0),
    )
}

/// Runs a 2v2 skirmish to completion and returns every event.
fn run(seed: u64) -> Vec<CombatEvent> {
    let mut session = aggressive_session(seed);
    session
        .start(
            vec![
                entrant(player(1, 120.0, 40.0), &[lucky_blade(), heavy()]),
                entrant(player(2, 90.0, 20.0), &[lucky_blade()]),
            ],
            vec![
                entrant(enemy(3, 150.0), &[lucky_blade()]),
                entrant(enemy(4, 110.0), &[lucky_blade()]),
            ],
        )
        .unwrap();
    autopilot(&mut session, 0.75, 500);
    assert!(!session.is_active(), "encounter did not finish");
    session.take_events()
}

fn crits(events: &[CombatEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|event| match event {
            CombatEvent::ActionResolved { was_crit, .. } => Some(*was_crit),
            _ => None,
        })
        .collect()
}

#[test]
fn same_seed_same_events() {
    assert_eq!(run(42), run(42));
}

#[test]
fn different_seeds_roll_differently() {
    let a = crits(&run(1));
    let b = crits(&run(2));
    assert!(a.len() > 10);
    assert_ne!(a, b);
}

#[test]
fn events_survive_json_round_trip() {
    let events = run(7);
    let json = serde_json::to_string(&events).unwrap();
    let back: Vec<CombatEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, events);
}
