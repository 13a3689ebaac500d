//! The timer queue.
//!
//! A [`TimerQueue`] keeps its own notion of "now", advanced only by the host.
//! Pending timers live in a `BTreeMap` keyed by [`TimerId`] so that iteration
//! order, and therefore expiry order for timers sharing a deadline, is
//! deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Delay, TimerId};

/// A pending timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Pending<K> {
    key: K,
    deadline: f64,
}

/// A timer that fired during [`TimerQueue::advance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expired<K> {
    /// Handle the timer was scheduled under.
    pub id: TimerId,
    /// Caller-supplied key.
    pub key: K,
    /// Queue time at which the timer was due.
    pub deadline: f64,
}

/// Deterministic, externally driven timer queue.
///
/// # Cancellation
///
/// [`cancel`](Self::cancel) is idempotent. Cancelling a handle that already
/// fired, was already cancelled, or was never issued returns `false` and
/// leaves the queue untouched.
///
/// # Example
///
/// ```
/// use tempo::{Delay, TimerQueue};
///
/// let mut timers = TimerQueue::new();
/// let a = timers.schedule(1_u32, Delay::from_secs(1.0)?);
/// let b = timers.schedule(2_u32, Delay::from_secs(0.5)?);
///
/// let fired = timers.advance(Delay::from_secs(1.0)?);
/// let ids: Vec<_> = fired.iter().map(|e| e.id).collect();
/// assert_eq!(ids, vec![b, a]); // earliest deadline first
/// assert!(timers.is_empty());
/// # Ok::<(), tempo::TimerError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerQueue<K> {
    now: f64,
    next_id: u64,
    pending: BTreeMap<TimerId, Pending<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    /// Creates an empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Current queue time in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedules `key` to fire `delay` from now.
    pub fn schedule(&mut self, key: K, delay: Delay) -> TimerId {
        let id = TimerId::new(self.next_id);
        self.next_id += 1;
        let deadline = self.now + delay.as_secs();
        trace!(%id, deadline, "timer scheduled");
        self.pending.insert(id, Pending { key, deadline });
        id
    }

    /// Cancels a pending timer.
    ///
    /// Returns `true` if the timer was pending and is now cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let removed = self.pending.remove(&id).is_some();
        trace!(%id, removed, "timer cancel");
        removed
    }

    /// Returns true if `id` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Seconds left before `id` fires, if it is pending.
    #[must_use]
    pub fn remaining(&self, id: TimerId) -> Option<f64> {
        self.pending
            .get(&id)
            .map(|pending| (pending.deadline - self.now).max(0.0))
    }

    /// Cancels every pending timer, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Moves time forward by `dt` and returns the timers that fired.
    ///
    /// A timer fires once `now >= deadline`. Fired timers are returned
    /// ordered by deadline, ties broken by handle (scheduling order).
    pub fn advance(&mut self, dt: Delay) -> Vec<Expired<K>> {
        self.now += dt.as_secs();
        let now = self.now;

        let due: Vec<TimerId> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        let mut fired: Vec<Expired<K>> = due
            .into_iter()
            .filter_map(|id| {
                self.pending.remove(&id).map(|pending| Expired {
                    id,
                    key: pending.key,
                    deadline: pending.deadline,
                })
            })
            .collect();

        fired.sort_by(|a, b| a.deadline.total_cmp(&b.deadline).then(a.id.cmp(&b.id)));
        fired
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(seconds: f64) -> Delay {
        Delay::from_secs(seconds).unwrap()
    }

    mod schedule_tests {
        use super::*;

        #[test]
        fn handles_are_unique_and_increasing() {
            let mut timers = TimerQueue::new();
            let a = timers.schedule((), secs(1.0));
            let b = timers.schedule((), secs(1.0));
            assert!(a < b);
            assert_eq!(timers.len(), 2);
        }

        #[test]
        fn handles_not_reused_after_cancel() {
            let mut timers = TimerQueue::new();
            let a = timers.schedule((), secs(1.0));
            timers.cancel(a);
            let b = timers.schedule((), secs(1.0));
            assert_ne!(a, b);
        }

        #[test]
        fn remaining_counts_down() {
            let mut timers = TimerQueue::new();
            let id = timers.schedule((), secs(2.0));
            timers.advance(secs(0.5));
            assert_eq!(timers.remaining(id), Some(1.5));
        }
    }

    mod cancel_tests {
        use super::*;

        #[test]
        fn cancel_twice_is_noop() {
            let mut timers = TimerQueue::new();
            let id = timers.schedule("x", secs(1.0));
            assert!(timers.cancel(id));
            assert!(!timers.cancel(id));
            assert!(timers.is_empty());
        }

        #[test]
        fn cancel_after_fire_is_noop() {
            let mut timers = TimerQueue::new();
            let id = timers.schedule("x", secs(1.0));
            let fired = timers.advance(secs(1.0));
            assert_eq!(fired.len(), 1);
            assert!(!timers.cancel(id));
        }

        #[test]
        fn cancel_unknown_handle_is_noop() {
            let mut timers: TimerQueue<&str> = TimerQueue::new();
            assert!(!timers.cancel(TimerId::new(99)));
        }

        #[test]
        fn cancelled_timer_never_fires() {
            let mut timers = TimerQueue::new();
            let id = timers.schedule("x", secs(1.0));
            timers.cancel(id);
            assert!(timers.advance(secs(5.0)).is_empty());
        }

        #[test]
        fn clear_drops_everything() {
            let mut timers = TimerQueue::new();
            timers.schedule(1, secs(1.0));
            timers.schedule(2, secs(2.0));
            assert_eq!(timers.clear(), 2);
            assert!(timers.advance(secs(10.0)).is_empty());
        }
    }

    mod advance_tests {
        use super::*;

        #[test]
        fn fires_exactly_at_deadline() {
            let mut timers = TimerQueue::new();
            timers.schedule("x", secs(2.0));
            assert!(timers.advance(secs(1.0)).is_empty());
            let fired = timers.advance(secs(1.0));
            assert_eq!(fired.len(), 1);
            assert_eq!(fired[0].deadline, 2.0);
        }

        #[test]
        fn zero_delay_fires_on_next_advance() {
            let mut timers = TimerQueue::new();
            timers.schedule("x", secs(0.0));
            assert_eq!(timers.advance(secs(0.0)).len(), 1);
        }

        #[test]
        fn equal_deadlines_fire_in_schedule_order() {
            let mut timers = TimerQueue::new();
            let a = timers.schedule("a", secs(1.0));
            let b = timers.schedule("b", secs(1.0));
            let fired = timers.advance(secs(1.0));
            assert_eq!(fired[0].id, a);
            assert_eq!(fired[1].id, b);
        }

        #[test]
        fn zero_advance_keeps_time() {
            let mut timers: TimerQueue<()> = TimerQueue::new();
            timers.advance(secs(0.25));
            timers.advance(Delay::ZERO);
            assert_eq!(timers.now(), 0.25);
        }

        #[test]
        fn queue_serializes() {
            let mut timers = TimerQueue::new();
            timers.schedule(5_u64, secs(1.0));
            let json = serde_json::to_string(&timers).unwrap();
            let restored: TimerQueue<u64> = serde_json::from_str(&json).unwrap();
            assert_eq!(restored.len(), 1);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_timer_fires_once_when_time_passes_all_deadlines(
                delays in proptest::collection::vec(0.0f64..100.0, 0..32)
            ) {
                let mut timers = TimerQueue::new();
                for (i, delay) in delays.iter().enumerate() {
                    timers.schedule(i, secs(*delay));
                }
                let fired = timers.advance(secs(100.0));
                prop_assert_eq!(fired.len(), delays.len());
                prop_assert!(timers.is_empty());
                for pair in fired.windows(2) {
                    prop_assert!(pair[0].deadline <= pair[1].deadline);
                }
            }

            #[test]
            fn redundant_cancels_never_disturb_pending(
                cancels in 1usize..5
            ) {
                let mut timers = TimerQueue::new();
                let stale = timers.schedule("stale", secs(1.0));
                let live = timers.schedule("live", secs(1.0));
                prop_assert!(timers.cancel(stale));
                for _ in 0..cancels {
                    prop_assert!(!timers.cancel(stale));
                }
                prop_assert!(timers.is_pending(live));
            }
        }
    }
}
