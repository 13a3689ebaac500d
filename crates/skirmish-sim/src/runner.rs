//! Headless encounter execution.
//!
//! Players are flown by [`AggressiveAi`] just like the enemies, so a run
//! needs no input. After every player turn the runner advances the session
//! clock by the encounter's `seconds_per_turn`, which is what makes
//! cooldowns recover and combos lapse.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use skirmish_core::prelude::*;
use skirmish_core::registry::Loadout;
use tracing::{debug, info};

use crate::encounter::Encounter;

/// Final state of one combatant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatantSummary {
    /// Combatant id.
    pub id: CombatantId,
    /// Display name.
    pub name: String,
    /// Side.
    pub team: Team,
    /// Health at the end.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Whether it was still standing.
    pub alive: bool,
    /// Damage dealt over the run, after mitigation and overkill.
    pub damage_dealt: f32,
    /// Health restored to others or itself.
    pub healing_done: f32,
}

/// Outcome of one seeded run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Seed used for the crit RNG.
    pub seed: u64,
    /// Winning side, or `None` for a forced end.
    pub winner: Option<Team>,
    /// Round the encounter ended in.
    pub rounds: u32,
    /// Whether the run hit `max_rounds`.
    pub timed_out: bool,
    /// Abilities that resolved.
    pub actions: u32,
    /// Resolved abilities that crit.
    pub crits: u32,
    /// Longest combo any combatant reached.
    pub best_combo: u32,
    /// Every combatant in turn order.
    pub combatants: Vec<CombatantSummary>,
    /// The full event stream, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<CombatEvent>>,
}

/// Aggregate of a batch of runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// Player victories.
    pub player_wins: usize,
    /// Enemy victories.
    pub enemy_wins: usize,
    /// Runs stopped without a winner.
    pub draws: usize,
    /// Mean rounds per run.
    pub mean_rounds: f64,
    /// Individual runs, ordered by seed offset.
    pub runs: Vec<RunSummary>,
}

impl BatchReport {
    /// Tallies `runs`.
    #[must_use]
    pub fn from_runs(runs: Vec<RunSummary>) -> Self {
        let count = |team: Team| runs.iter().filter(|run| run.winner == Some(team)).count();
        let total_rounds: u64 = runs.iter().map(|run| u64::from(run.rounds)).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean_rounds = if runs.is_empty() {
            0.0
        } else {
            total_rounds as f64 / runs.len() as f64
        };
        Self {
            player_wins: count(Team::Player),
            enemy_wins: count(Team::Enemy),
            draws: runs.iter().filter(|run| run.winner.is_none()).count(),
            mean_rounds,
            runs,
        }
    }
}

/// Plays `encounter` to the end with the crit RNG seeded by `seed`.
///
/// # Errors
///
/// Fails if the encounter cannot be started or the session reports an
/// integration error mid-run.
pub fn run(encounter: &Encounter, seed: u64, keep_events: bool) -> Result<RunSummary> {
    let config = CombatConfig {
        seed,
        ..encounter.config.clone()
    };
    let mut session =
        CombatSession::new(config, AggressiveAi::new()).context("failed to create session")?;
    let (players, enemies) = encounter.entrants()?;
    session
        .start(players, enemies)
        .context("failed to start encounter")?;

    let mut pilot = AggressiveAi::new();
    let mut timed_out = false;
    while let Phase::AwaitingAction(actor) = session.phase() {
        if session.round() > encounter.max_rounds {
            timed_out = true;
            session.end_combat();
            break;
        }
        play_turn(&mut session, &mut pilot, actor)?;
        session
            .tick(encounter.seconds_per_turn)
            .context("failed to advance the session clock")?;
    }

    let events = session.take_events();
    let summary = summarize(&session, seed, timed_out, &events, keep_events.then(|| events.clone()));
    info!(
        seed,
        winner = ?summary.winner,
        rounds = summary.rounds,
        timed_out,
        "run finished"
    );
    Ok(summary)
}

/// Plays `runs` encounters in parallel, seeded `base_seed`, `base_seed + 1`, ...
///
/// # Errors
///
/// Fails with the first failing run.
pub fn run_batch(
    encounter: &Encounter,
    base_seed: u64,
    runs: u32,
    keep_events: bool,
) -> Result<BatchReport> {
    let summaries = (0..runs)
        .into_par_iter()
        .map(|offset| {
            let seed = base_seed.wrapping_add(u64::from(offset));
            run(encounter, seed, keep_events).with_context(|| format!("run with seed {seed} failed"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(BatchReport::from_runs(summaries))
}

fn play_turn(
    session: &mut CombatSession,
    pilot: &mut AggressiveAi,
    actor: CombatantId,
) -> Result<()> {
    let decision = {
        let state = session
            .combatant(actor)
            .with_context(|| format!("turn holder {actor} is not in the roster"))?;
        let empty = Loadout::default();
        let view = TurnView {
            actor: state,
            roster: session.roster(),
            loadout: session.loadout(actor).unwrap_or(&empty),
            round: session.round(),
        };
        pilot.decide_action(&view)
    };

    let Some(decision) = decision else {
        debug!(%actor, "autopilot has nothing usable, passing");
        session.pass_turn(actor)?;
        return Ok(());
    };
    match session.submit_action(actor, decision.target, &decision.ability) {
        Ok(_) => Ok(()),
        Err(SessionError::Declined(reason)) => {
            debug!(%actor, %reason, "autopilot action declined, passing");
            session.pass_turn(actor)?;
            Ok(())
        }
        Err(other) => Err(other).with_context(|| format!("turn of {actor} failed")),
    }
}

fn summarize(
    session: &CombatSession,
    seed: u64,
    timed_out: bool,
    events: &[CombatEvent],
    kept: Option<Vec<CombatEvent>>,
) -> RunSummary {
    let mut damage: BTreeMap<CombatantId, f32> = BTreeMap::new();
    let mut healing: BTreeMap<CombatantId, f32> = BTreeMap::new();
    let mut actions = 0;
    let mut crits = 0;
    let mut best_combo = 0;

    for event in events {
        match event {
            CombatEvent::ActionResolved {
                actor,
                amount,
                was_crit,
                effect,
                ..
            } => {
                actions += 1;
                crits += u32::from(*was_crit);
                let ledger = match effect {
                    Effect::Damage => &mut damage,
                    Effect::Heal => &mut healing,
                };
                *ledger.entry(*actor).or_default() += *amount;
            }
            CombatEvent::ComboChanged { hit_count, .. } => best_combo = best_combo.max(*hit_count),
            _ => {}
        }
    }

    let combatants = session
        .roster()
        .iter()
        .map(|state| CombatantSummary {
            id: state.id(),
            name: state.name().to_string(),
            team: state.team(),
            health: state.health().current(),
            max_health: state.health().max(),
            alive: state.is_alive(),
            damage_dealt: damage.get(&state.id()).copied().unwrap_or(0.0),
            healing_done: healing.get(&state.id()).copied().unwrap_or(0.0),
        })
        .collect();

    let winner = match session.phase() {
        Phase::Ended { winner } => winner,
        _ => None,
    };

    RunSummary {
        seed,
        winner,
        rounds: session.round(),
        timed_out,
        actions,
        crits,
        best_combo,
        combatants,
        events: kept,
    }
}
