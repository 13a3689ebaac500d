//! The combat session state machine.
//!
//! A [`CombatSession`] owns everything for one encounter: the roster, the
//! ability registry, the damage resolver, the combo tracker and the event
//! log. It is the only place turn order is decided.
//!
//! # Phases
//!
//! ```text
//! Idle --start--> Running <--> AwaitingAction(actor) --> Ended { winner }
//! ```
//!
//! - **Idle**: created, not started.
//! - **Running**: the turn loop is working through AI turns. The loop never
//!   yields in this phase unless the AI returned a decision the engine
//!   cannot carry out; the session then stays `Running` on that turn until
//!   the host calls [`resume`](CombatSession::resume) or
//!   [`end_combat`](CombatSession::end_combat).
//! - **AwaitingAction**: a `Player` combatant holds the turn. Nothing inside
//!   the engine moves until [`submit_action`](CombatSession::submit_action)
//!   or [`pass_turn`](CombatSession::pass_turn) arrives. [`tick`](CombatSession::tick)
//!   keeps cooldowns and combos running in the meantime.
//! - **Ended**: terminal. A new encounter needs a new session.
//!
//! # Turn loop
//!
//! Each iteration checks for the end of combat, skips a defeated slot,
//! announces the turn, then either suspends (player) or asks the
//! [`AiController`] and resolves its decision immediately. The loop always
//! reaches a living player within one pass over the roster, or the combat
//! ends, so it cannot spin.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use skirmish_core::prelude::*;
//!
//! let smash = Arc::new(Ability::new("smash", "Smash", 15.0));
//! let hero = Entrant::new(CombatantState::new(CombatantId::new(1), "A", Team::Player, 10.0, 0.0))
//!     .with_ability(Arc::clone(&smash));
//! let imp = Entrant::new(CombatantState::new(CombatantId::new(2), "B", Team::Enemy, 10.0, 0.0))
//!     .with_ability(smash);
//!
//! let mut session = CombatSession::new(CombatConfig::default(), AggressiveAi::new())?;
//! session.start(vec![hero], vec![imp])?;
//! assert_eq!(session.current_actor(), Some(CombatantId::new(1)));
//!
//! let hit = session.submit_action(CombatantId::new(1), CombatantId::new(2), &"smash".into())?;
//! assert!(hit.killed);
//! assert_eq!(session.phase(), Phase::Ended { winner: Some(Team::Player) });
//! # Ok::<(), skirmish_core::error::SessionError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tempo::Delay;
use tracing::{debug, error, info, trace, warn};

use crate::ability::{Ability, AbilityId};
use crate::ai::{AiController, Decision, TurnView};
use crate::combatant::{CombatantId, CombatantState, Team};
use crate::combo::ComboTracker;
use crate::config::{CombatConfig, ConfigError};
use crate::error::{Decline, SessionError};
use crate::event::CombatEvent;
use crate::registry::{AbilityRegistry, Loadout};
use crate::resolver::{DamageResolver, Resolution};
use crate::roster::Roster;

// =============================================================================
// Entrant
// =============================================================================

/// A combatant entering an encounter together with its abilities.
#[derive(Debug, Clone)]
pub struct Entrant {
    /// Starting state.
    pub state: CombatantState,
    /// Ability templates the combatant may use.
    pub abilities: Vec<Arc<Ability>>,
}

impl Entrant {
    /// An entrant with no abilities.
    #[must_use]
    pub fn new(state: CombatantState) -> Self {
        Self {
            state,
            abilities: Vec::new(),
        }
    }

    /// Adds one ability.
    #[must_use]
    pub fn with_ability(mut self, ability: Arc<Ability>) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Adds several abilities.
    #[must_use]
    pub fn with_abilities(mut self, abilities: impl IntoIterator<Item = Arc<Ability>>) -> Self {
        self.abilities.extend(abilities);
        self
    }
}

// =============================================================================
// Phase
// =============================================================================

/// Where a session is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Not started.
    Idle,
    /// Working through AI turns, or halted on a faulty AI decision.
    Running,
    /// Suspended until the named player acts or passes.
    AwaitingAction(CombatantId),
    /// Over. `winner` is `None` for a forced end or mutual defeat.
    Ended {
        /// Side with survivors.
        winner: Option<Team>,
    },
}

impl Phase {
    /// Running or awaiting an action.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::AwaitingAction(_))
    }
}

// =============================================================================
// CombatSession
// =============================================================================

/// One encounter.
///
/// The session is `Send`; hosts with several threads process each session
/// under one owner at a time. Separate sessions share nothing.
pub struct CombatSession {
    config: CombatConfig,
    phase: Phase,
    roster: Roster,
    registry: AbilityRegistry,
    resolver: DamageResolver,
    combos: ComboTracker,
    ai: Box<dyn AiController>,
    turn_index: usize,
    round: u32,
    events: Vec<CombatEvent>,
}

impl fmt::Debug for CombatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatSession")
            .field("phase", &self.phase)
            .field("roster", &self.roster)
            .field("registry", &self.registry)
            .field("combos", &self.combos)
            .field("ai", &"<dyn AiController>")
            .field("turn_index", &self.turn_index)
            .field("round", &self.round)
            .field("events", &format!("[{} buffered]", self.events.len()))
            .finish_non_exhaustive()
    }
}

impl CombatSession {
    /// Creates an idle session.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` does not validate.
    pub fn new<A>(config: CombatConfig, ai: A) -> Result<Self, ConfigError>
    where
        A: AiController + 'static,
    {
        config.validate()?;
        Ok(Self {
            combos: ComboTracker::new(config.combo.clone())?,
            resolver: DamageResolver::new(&config),
            config,
            phase: Phase::Idle,
            roster: Roster::new(),
            registry: AbilityRegistry::new(),
            ai: Box::new(ai),
            turn_index: 0,
            round: 0,
            events: Vec::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Control
    // -------------------------------------------------------------------------

    /// Starts the encounter and runs until the first player turn or the end.
    ///
    /// Turn order is `players` then `enemies`, as given. Every cooldown
    /// starts at 0.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AlreadyActive`] while an encounter is running; the
    ///   running encounter is untouched
    /// - [`SessionError::SessionOver`] once the session has ended
    /// - [`SessionError::Roster`] for an empty, duplicated or mis-tagged party
    /// - [`SessionError::InvalidAbility`] for a template that fails validation
    /// - [`SessionError::InvalidAiDecision`] if an opening AI turn faults;
    ///   the encounter has started in that case
    pub fn start(
        &mut self,
        players: Vec<Entrant>,
        enemies: Vec<Entrant>,
    ) -> Result<(), SessionError> {
        match self.phase {
            Phase::Idle => {}
            Phase::Ended { .. } => {
                warn!("start ignored: session already ended");
                return Err(SessionError::SessionOver);
            }
            Phase::Running | Phase::AwaitingAction(_) => {
                warn!("start ignored: combat already in progress");
                return Err(SessionError::AlreadyActive);
            }
        }

        let mut loadouts = Vec::with_capacity(players.len() + enemies.len());
        let mut split = |party: Vec<Entrant>| -> Vec<CombatantState> {
            party
                .into_iter()
                .map(|entrant| {
                    loadouts.push((entrant.state.id(), entrant.abilities));
                    entrant.state
                })
                .collect()
        };
        let players = split(players);
        let enemies = split(enemies);

        let roster = Roster::from_parties(players, enemies)?;
        let mut registry = AbilityRegistry::new();
        for (id, abilities) in loadouts {
            registry.seed(id, abilities)?;
        }

        self.roster = roster;
        self.registry = registry;
        self.turn_index = 0;
        self.round = 1;
        self.phase = Phase::Running;
        self.events.push(CombatEvent::CombatStarted {
            combatants: self.roster.len(),
        });
        info!(combatants = self.roster.len(), seed = self.config.seed, "combat started");

        self.run_turns()
    }

    /// Resolves the turn holder's action and runs on to the next player turn.
    ///
    /// Checks, in order: an encounter is running, `actor` is in the roster,
    /// `actor` holds the turn, `target` is in the roster, `target` is alive,
    /// then the registry gates.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Declined`] when the action is refused; nothing
    ///   changed and the turn is still open
    /// - [`SessionError::UnknownCombatant`] for an id not in the roster
    /// - [`SessionError::InvalidAiDecision`] if a following AI turn faults;
    ///   this action has already resolved and is in the event log
    pub fn submit_action(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        ability: &AbilityId,
    ) -> Result<Resolution, SessionError> {
        self.ensure_turn_holder(actor)?;
        let Some(target_state) = self.roster.get(target) else {
            return Err(SessionError::UnknownCombatant(target));
        };
        if !target_state.is_alive() {
            return Err(self.decline(actor, Decline::TargetDefeated { target }));
        }

        let resolution = match self.registry.try_use(
            actor,
            target,
            ability,
            &mut self.roster,
            &mut self.resolver,
            &mut self.combos,
        ) {
            Ok(resolution) => resolution,
            Err(SessionError::Declined(reason)) => return Err(self.decline(actor, reason)),
            Err(other) => return Err(other),
        };

        self.record(&resolution);
        self.phase = Phase::Running;
        self.advance_turn();
        self.run_turns()?;
        Ok(resolution)
    }

    /// The turn holder forgoes its action.
    ///
    /// # Errors
    ///
    /// Same as [`submit_action`](Self::submit_action) for the actor checks.
    pub fn pass_turn(&mut self, actor: CombatantId) -> Result<(), SessionError> {
        self.ensure_turn_holder(actor)?;
        self.events.push(CombatEvent::TurnPassed { actor });
        debug!(%actor, "turn passed");
        self.phase = Phase::Running;
        self.advance_turn();
        self.run_turns()
    }

    /// Continues after an AI fault by passing the faulted turn.
    ///
    /// Does nothing unless the session is `Running`.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidAiDecision`] if a later AI turn faults too.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Running {
            trace!(phase = ?self.phase, "resume ignored");
            return Ok(());
        }
        if let Some(actor) = self.roster.at(self.turn_index).map(CombatantState::id) {
            self.events.push(CombatEvent::TurnPassed { actor });
            warn!(%actor, "faulted AI turn skipped");
        }
        self.advance_turn();
        self.run_turns()
    }

    /// Forces the encounter to end with no winner.
    ///
    /// Every pending combo timer is cancelled before this returns. Calling
    /// it again, or on an idle session, does nothing.
    pub fn end_combat(&mut self) {
        match self.phase {
            Phase::Running | Phase::AwaitingAction(_) => self.finish(None),
            Phase::Idle => warn!("end_combat ignored: no combat in progress"),
            Phase::Ended { .. } => trace!("end_combat ignored: already ended"),
        }
    }

    /// Advances cooldowns and combo timers by `delta_seconds`.
    ///
    /// Runs regardless of whose turn it is. Does nothing unless an encounter
    /// is in progress.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidDelta`] for a negative or non-finite step;
    /// nothing advances in that case.
    pub fn tick(&mut self, delta_seconds: f32) -> Result<(), SessionError> {
        let dt = Delay::from_secs_f32(delta_seconds)
            .map_err(|_| SessionError::InvalidDelta(delta_seconds))?;
        if !self.is_active() {
            trace!(delta_seconds, "tick ignored: no combat in progress");
            return Ok(());
        }
        self.registry.tick(delta_seconds);
        for lapsed in self.combos.tick(dt) {
            self.events.push(CombatEvent::combo(&lapsed));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------------

    /// All combatants in turn order.
    #[must_use]
    pub fn roster(&self) -> &[CombatantState] {
        self.roster.as_slice()
    }

    /// One combatant.
    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&CombatantState> {
        self.roster.get(id)
    }

    /// Running or awaiting an action.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Who holds the turn, while an encounter is in progress.
    #[must_use]
    pub fn current_actor(&self) -> Option<CombatantId> {
        match self.phase {
            Phase::AwaitingAction(actor) => Some(actor),
            Phase::Running => self.roster.at(self.turn_index).map(CombatantState::id),
            Phase::Idle | Phase::Ended { .. } => None,
        }
    }

    /// Round number, starting at 1. Zero before the encounter starts.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// `actor`'s abilities and cooldowns.
    #[must_use]
    pub fn loadout(&self, actor: CombatantId) -> Option<&Loadout> {
        self.registry.loadout(actor)
    }

    /// Seconds until `actor` may use `ability` again.
    #[must_use]
    pub fn cooldown_remaining(&self, actor: CombatantId, ability: &AbilityId) -> Option<f32> {
        self.registry.cooldown_remaining(actor, ability)
    }

    /// `actor`'s consecutive hits.
    #[must_use]
    pub fn combo_hits(&self, actor: CombatantId) -> u32 {
        self.combos.hit_count(actor)
    }

    /// `actor`'s current combo multiplier.
    #[must_use]
    pub fn combo_multiplier(&self, actor: CombatantId) -> f32 {
        self.combos.current_multiplier(actor)
    }

    /// Buffered events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Drains the event buffer.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Configuration the session was built with.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn ensure_turn_holder(&mut self, actor: CombatantId) -> Result<(), SessionError> {
        if self.phase == Phase::Idle {
            warn!(%actor, "action declined: combat has not started");
            return Err(Decline::SessionInactive.into());
        }
        if !self.is_active() {
            return Err(self.decline(actor, Decline::SessionInactive));
        }
        if self.roster.get(actor).is_none() {
            return Err(SessionError::UnknownCombatant(actor));
        }
        if self.phase != Phase::AwaitingAction(actor) {
            return Err(self.decline(actor, Decline::NotYourTurn { actor }));
        }
        Ok(())
    }

    fn decline(&mut self, actor: CombatantId, reason: Decline) -> SessionError {
        warn!(%actor, %reason, "action declined");
        self.events.push(CombatEvent::ActionDeclined {
            actor,
            reason: reason.clone(),
        });
        SessionError::Declined(reason)
    }

    fn record(&mut self, resolution: &Resolution) {
        self.events.push(CombatEvent::resolved(resolution));
        if let Some(combo) = &resolution.combo {
            self.events.push(CombatEvent::combo(combo));
        }
        if resolution.killed {
            info!(target = %resolution.target, by = %resolution.actor, "combatant defeated");
            self.events.push(CombatEvent::CombatantDefeated {
                actor: resolution.target,
            });
        }
    }

    fn advance_turn(&mut self) {
        let len = self.roster.len();
        if len == 0 {
            return;
        }
        self.turn_index = (self.turn_index + 1) % len;
        if self.turn_index == 0 {
            self.round = self.round.saturating_add(1);
        }
    }

    /// Ends the encounter if a side has nobody standing.
    fn check_end(&mut self) -> bool {
        let players = self.roster.has_living(Team::Player);
        let enemies = self.roster.has_living(Team::Enemy);
        if players && enemies {
            return false;
        }
        let winner = match (players, enemies) {
            (true, false) => Some(Team::Player),
            (false, true) => Some(Team::Enemy),
            _ => None,
        };
        self.finish(winner);
        true
    }

    fn finish(&mut self, winner: Option<Team>) {
        let cancelled = self.combos.clear();
        self.phase = Phase::Ended { winner };
        self.events.push(CombatEvent::CombatEnded { winner });
        info!(?winner, round = self.round, cancelled_combos = cancelled, "combat ended");
    }

    fn run_turns(&mut self) -> Result<(), SessionError> {
        loop {
            if self.check_end() {
                return Ok(());
            }
            let Some(state) = self.roster.at(self.turn_index) else {
                self.finish(None);
                return Ok(());
            };
            if !state.is_alive() {
                self.advance_turn();
                continue;
            }
            let actor = state.id();
            let team = state.team();
            self.events.push(CombatEvent::TurnStarted {
                actor,
                round: self.round,
            });
            debug!(%actor, %team, round = self.round, "turn started");

            if team.is_player_controlled() {
                self.phase = Phase::AwaitingAction(actor);
                return Ok(());
            }
            self.phase = Phase::Running;
            self.take_ai_turn(actor)?;
            self.advance_turn();
        }
    }

    fn take_ai_turn(&mut self, actor: CombatantId) -> Result<(), SessionError> {
        let empty = Loadout::default();
        let decision = {
            let Some(state) = self.roster.get(actor) else {
                return Err(SessionError::UnknownCombatant(actor));
            };
            let view = TurnView {
                actor: state,
                roster: self.roster.as_slice(),
                loadout: self.registry.loadout(actor).unwrap_or(&empty),
                round: self.round,
            };
            self.ai.decide_action(&view)
        };

        let Some(decision) = decision else {
            self.events.push(CombatEvent::TurnPassed { actor });
            debug!(%actor, "AI passed");
            return Ok(());
        };

        if let Some(reason) = self.decision_fault(actor, &decision) {
            error!(%actor, %reason, "invalid AI decision");
            return Err(SessionError::InvalidAiDecision { actor, reason });
        }

        match self.registry.try_use(
            actor,
            decision.target,
            &decision.ability,
            &mut self.roster,
            &mut self.resolver,
            &mut self.combos,
        ) {
            Ok(resolution) => {
                self.record(&resolution);
                Ok(())
            }
            Err(SessionError::Declined(reason)) => {
                self.decline(actor, reason);
                self.events.push(CombatEvent::TurnPassed { actor });
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// What makes an AI decision impossible to carry out, if anything.
    fn decision_fault(&self, actor: CombatantId, decision: &Decision) -> Option<String> {
        match self.roster.get(decision.target) {
            None => return Some(format!("target {} is not in the roster", decision.target)),
            Some(target) if !target.is_alive() => {
                return Some(format!("target {} is already defeated", decision.target));
            }
            Some(_) => {}
        }
        let owned = self
            .registry
            .loadout(actor)
            .is_some_and(|loadout| loadout.get(&decision.ability).is_some());
        if !owned {
            return Some(format!("ability {} is not in the actor's loadout", decision.ability));
        }
        None
    }
}
