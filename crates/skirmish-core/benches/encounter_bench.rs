use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skirmish_core::combo::ComboTracker;
use skirmish_core::prelude::*;
use skirmish_core::tempo::Delay;

fn party() -> (Vec<Entrant>, Vec<Entrant>) {
    let slash = Arc::new(Ability::new("slash", "Slash", 9.0).with_crit(0.2, 2.0));
    let fireball = Arc::new(
        Ability::new("fireball", "Fireball", 30.0)
            .with_damage_type(DamageType::Fire)
            .with_cost(20.0)
            .with_cooldown(3.0),
    );
    let bite = Arc::new(Ability::new("bite", "Bite", 6.0));

    let players = (1..=3)
        .map(|id| {
            Entrant::new(CombatantState::new(CombatantId::new(id), "Hero", Team::Player, 120.0, 60.0))
                .with_ability(Arc::clone(&slash))
                .with_ability(Arc::clone(&fireball))
        })
        .collect();
    let enemies = (10..14)
        .map(|id| {
            Entrant::new(CombatantState::new(CombatantId::new(id), "Ghoul", Team::Enemy, 90.0, 0.0))
                .with_ability(Arc::clone(&bite))
        })
        .collect();
    (players, enemies)
}

/// Plays one encounter to the end with both sides on [`AggressiveAi`].
fn play(seed: u64) -> Phase {
    let mut session = CombatSession::new(CombatConfig::with_seed(seed), AggressiveAi::new()).unwrap();
    let (players, enemies) = party();
    session.start(players, enemies).unwrap();

    let mut pilot = AggressiveAi::new();
    while let Phase::AwaitingAction(actor) = session.phase() {
        let decision = match (session.combatant(actor), session.loadout(actor)) {
            (Some(state), Some(loadout)) => pilot.decide_action(&TurnView {
                actor: state,
                roster: session.roster(),
                loadout,
                round: session.round(),
            }),
            _ => None,
        };
        let acted = match decision {
            Some(d) => session.submit_action(actor, d.target, &d.ability).is_ok(),
            None => false,
        };
        if !acted && session.pass_turn(actor).is_err() {
            session.end_combat();
        }
        session.tick(1.0).unwrap();
        if session.round() > 200 {
            session.end_combat();
        }
    }
    session.phase()
}

fn bench_full_encounter(c: &mut Criterion) {
    c.bench_function("full_encounter", |b| b.iter(|| black_box(play(black_box(7)))));
}

fn bench_combo_churn(c: &mut Criterion) {
    // 64 attackers hitting in turn, with one lapse sweep per round
    let dt = Delay::from_secs(0.05).unwrap();
    c.bench_function("combo_churn", |b| {
        b.iter(|| {
            let mut combos = ComboTracker::new(ComboConfig::default()).unwrap();
            for round in 0..32u64 {
                for actor in 0..64u64 {
                    if (actor + round) % 5 != 0 {
                        combos.register_hit(CombatantId::new(actor));
                    }
                }
                black_box(combos.tick(dt));
            }
            combos.active_count()
        });
    });
}

criterion_group!(benches, bench_full_encounter, bench_combo_churn);
criterion_main!(benches);
