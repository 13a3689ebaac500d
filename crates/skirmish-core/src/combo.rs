//! Per-actor hit combos.
//!
//! The [`ComboTracker`] counts consecutive hits landed by each combatant.
//! Every hit restarts that combatant's expiry timer; if the timer runs out
//! before the next hit, the combo state is deleted outright and the
//! combatant is back to "no combo" (multiplier exactly 1.0).
//!
//! Combo state is keyed by [`CombatantId`] in a `BTreeMap`, and expiry timers
//! come from a [`tempo::TimerQueue`] driven by [`ComboTracker::tick`], so
//! combos keep lapsing while the turn loop is suspended on a player decision.
//!
//! # Invariant
//!
//! A combatant has combo state (`hit_count > 0`) exactly when it has a
//! pending expiry timer.
//!
//! # Example
//!
//! ```
//! use skirmish_core::combatant::CombatantId;
//! use skirmish_core::combo::ComboTracker;
//! use skirmish_core::config::ComboConfig;
//! use tempo::Delay;
//!
//! let mut combos = ComboTracker::new(ComboConfig::default())?;
//! let rogue = CombatantId::new(3);
//!
//! combos.register_hit(rogue);
//! assert_eq!(combos.current_multiplier(rogue), 1.0);
//! combos.register_hit(rogue);
//! assert_eq!(combos.current_multiplier(rogue), 1.1);
//!
//! // Window is 2 seconds by default.
//! let expired = combos.tick(Delay::from_secs(2.5)?);
//! assert_eq!(expired.len(), 1);
//! assert_eq!(combos.hit_count(rogue), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tempo::{Delay, TimerId, TimerQueue};
use tracing::debug;

use crate::combatant::CombatantId;
use crate::config::{ComboConfig, ConfigError};

/// Live combo state for one combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    hit_count: u32,
    last_hit_at: f64,
    expiry: TimerId,
}

impl ComboState {
    /// Consecutive hits in the current combo.
    #[must_use]
    pub const fn hit_count(&self) -> u32 {
        self.hit_count
    }

    /// Tracker time of the most recent hit, in seconds.
    #[must_use]
    pub const fn last_hit_at(&self) -> f64 {
        self.last_hit_at
    }

    /// Handle of the pending expiry timer.
    #[must_use]
    pub const fn expiry(&self) -> TimerId {
        self.expiry
    }
}

/// A combo count change worth telling observers about.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboUpdate {
    /// Combatant whose combo changed.
    pub actor: CombatantId,
    /// New hit count (0 once the combo has lapsed).
    pub hit_count: u32,
    /// Multiplier the next read will return.
    pub multiplier: f32,
}

/// Tracks consecutive hits per combatant.
#[derive(Debug, Clone)]
pub struct ComboTracker {
    config: ComboConfig,
    window: Delay,
    states: BTreeMap<CombatantId, ComboState>,
    timers: TimerQueue<CombatantId>,
}

impl ComboTracker {
    /// Creates a tracker with no active combos.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails [`ComboConfig::validate`].
    pub fn new(config: ComboConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let window = Delay::from_secs_f32(config.reset_window)
            .map_err(|_| ConfigError::InvalidResetWindow(config.reset_window))?;
        Ok(Self {
            config,
            window,
            states: BTreeMap::new(),
            timers: TimerQueue::new(),
        })
    }

    /// Combo parameters in use.
    #[must_use]
    pub fn config(&self) -> &ComboConfig {
        &self.config
    }

    /// Records a hit by `actor`, extending or starting its combo.
    ///
    /// Any pending expiry is cancelled and a new one is scheduled a full
    /// window after this hit.
    pub fn register_hit(&mut self, actor: CombatantId) -> ComboUpdate {
        let now = self.timers.now();
        if let Some(state) = self.states.get(&actor) {
            self.timers.cancel(state.expiry);
        }
        let expiry = self.timers.schedule(actor, self.window);
        let state = self.states.entry(actor).or_insert(ComboState {
            hit_count: 0,
            last_hit_at: now,
            expiry,
        });
        state.hit_count = state.hit_count.saturating_add(1);
        state.last_hit_at = now;
        state.expiry = expiry;
        let hit_count = state.hit_count;

        let multiplier = self.multiplier_for(hit_count);
        debug!(%actor, hit_count, multiplier, "combo extended");
        ComboUpdate {
            actor,
            hit_count,
            multiplier,
        }
    }

    /// Damage multiplier for `actor`'s current hit count.
    #[must_use]
    pub fn current_multiplier(&self, actor: CombatantId) -> f32 {
        self.multiplier_for(self.hit_count(actor))
    }

    fn multiplier_for(&self, hit_count: u32) -> f32 {
        if hit_count <= 1 {
            return 1.0;
        }
        let table = &self.config.damage_multipliers;
        let Some(last) = table.len().checked_sub(1) else {
            return 1.0;
        };
        let index = usize::try_from(hit_count - 2).map_or(last, |i| i.min(last));
        table[index]
    }

    /// Consecutive hits for `actor`, 0 when it has no combo.
    #[must_use]
    pub fn hit_count(&self, actor: CombatantId) -> u32 {
        self.states.get(&actor).map_or(0, ComboState::hit_count)
    }

    /// Live combo state for `actor`, if any.
    #[must_use]
    pub fn state(&self, actor: CombatantId) -> Option<&ComboState> {
        self.states.get(&actor)
    }

    /// Number of combatants with an active combo.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.states.len()
    }

    /// Advances the combo clock and drops combos whose window ran out.
    ///
    /// Returns one update (hit count 0, multiplier 1.0) per lapsed combo.
    /// A timer that fires for state that is already gone, or that was
    /// superseded by a newer hit, is ignored.
    pub fn tick(&mut self, dt: Delay) -> Vec<ComboUpdate> {
        let fired = self.timers.advance(dt);
        let mut lapsed = Vec::new();
        for expired in fired {
            let actor = expired.key;
            let current = self.states.get(&actor).map(ComboState::expiry);
            if current != Some(expired.id) {
                continue;
            }
            self.states.remove(&actor);
            debug!(%actor, "combo lapsed");
            lapsed.push(ComboUpdate {
                actor,
                hit_count: 0,
                multiplier: 1.0,
            });
        }
        lapsed
    }

    /// Drops `actor`'s combo and cancels its timer.
    ///
    /// Returns true if there was a combo to drop. Calling it again, or after
    /// the combo already lapsed, does nothing.
    pub fn reset(&mut self, actor: CombatantId) -> bool {
        match self.states.remove(&actor) {
            Some(state) => {
                self.timers.cancel(state.expiry);
                true
            }
            None => false,
        }
    }

    /// Drops every combo and cancels every pending timer.
    ///
    /// Returns how many combos were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.states.len();
        self.states.clear();
        self.timers.clear();
        dropped
    }
}

// =============================================================================
// Tests
// =============================================================================
