//! Timer handles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a scheduled timer.
///
/// Handles are issued in increasing order by a [`TimerQueue`](crate::TimerQueue)
/// and are never reused by that queue, so a handle that has fired or been
/// cancelled can be held (and cancelled again) safely.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    /// Creates a handle from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this handle.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_raw_value() {
        assert!(TimerId::new(1) < TimerId::new(2));
        assert_eq!(TimerId::new(7).as_u64(), 7);
    }

    #[test]
    fn display_and_debug() {
        assert_eq!(TimerId::new(3).to_string(), "timer:3");
        assert_eq!(format!("{:?}", TimerId::new(3)), "TimerId(3)");
    }
}
