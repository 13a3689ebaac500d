//! # Tempo
//!
//! Externally driven timers for turn-based simulations.
//!
//! Tempo never reads the wall clock. Time only moves when the host calls
//! [`TimerQueue::advance`], which makes timer behaviour reproducible and lets a
//! simulation keep timers running while its own control loop is suspended
//! (for example while waiting on a player decision).
//!
//! ## Quick Start
//!
//! ```
//! use tempo::{Delay, TimerQueue};
//!
//! let window = Delay::from_secs(2.0)?;
//! let mut timers: TimerQueue<&str> = TimerQueue::new();
//! let combo = timers.schedule("combo", window);
//!
//! assert!(timers.advance(Delay::from_secs(1.5)?).is_empty());
//!
//! // A new hit cancels the stale expiry and schedules a fresh one.
//! assert!(timers.cancel(combo));
//! assert!(!timers.cancel(combo)); // cancelling twice is a no-op
//! timers.schedule("combo", window);
//!
//! let fired = timers.advance(window);
//! assert_eq!(fired.len(), 1);
//! assert_eq!(fired[0].key, "combo");
//! # Ok::<(), tempo::TimerError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod handle;
pub mod queue;

pub use handle::TimerId;
pub use queue::{Expired, TimerQueue};

use serde::{Deserialize, Serialize};

/// Errors raised when a span of seconds cannot be used as a [`Delay`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TimerError {
    /// Durations must be zero or positive.
    #[error("duration must not be negative (got {0})")]
    NegativeDuration(f64),
    /// NaN and infinities cannot be scheduled or advanced by.
    #[error("duration must be finite (got {0})")]
    NonFinite(f64),
}

/// A validated, non-negative, finite span of time in seconds.
///
/// Building a `Delay` is the only fallible step; scheduling and advancing
/// with one cannot fail.
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Delay(f64);

impl Delay {
    /// No time at all.
    pub const ZERO: Self = Self(0.0);

    /// Validates `seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NonFinite`] for NaN or infinite values and
    /// [`TimerError::NegativeDuration`] for values below zero.
    pub fn from_secs(seconds: f64) -> Result<Self, TimerError> {
        if !seconds.is_finite() {
            return Err(TimerError::NonFinite(seconds));
        }
        if seconds < 0.0 {
            return Err(TimerError::NegativeDuration(seconds));
        }
        Ok(Self(seconds))
    }

    /// Same as [`from_secs`](Self::from_secs) for `f32` inputs.
    ///
    /// # Errors
    ///
    /// See [`from_secs`](Self::from_secs).
    pub fn from_secs_f32(seconds: f32) -> Result<Self, TimerError> {
        Self::from_secs(f64::from(seconds))
    }

    /// Length in seconds.
    #[must_use]
    pub const fn as_secs(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Delay {
    type Error = TimerError;

    fn try_from(seconds: f64) -> Result<Self, Self::Error> {
        Self::from_secs(seconds)
    }
}

impl From<Delay> for f64 {
    fn from(delay: Delay) -> Self {
        delay.0
    }
}
