//! Playback clock binding.
//!
//! The store only asks the clock one question: is playback following live data?
//! In file mode (no clock, or a clock not in live mode) platforms expire outside
//! their first/last update times.

use std::cell::Cell;

/// Source of the playback mode.
pub trait Clock {
    /// Returns true while playback follows incoming live data.
    fn is_live_mode(&self) -> bool;
}

/// A clock whose mode is set by the application.
#[derive(Debug, Default)]
pub struct PlaybackClock {
    live: Cell<bool>,
}

impl PlaybackClock {
    /// Creates a clock in file mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock in live mode.
    #[must_use]
    pub fn live() -> Self {
        Self {
            live: Cell::new(true),
        }
    }

    /// Switches between live and file mode.
    pub fn set_live_mode(&self, live: bool) {
        self.live.set(live);
    }
}

impl Clock for PlaybackClock {
    fn is_live_mode(&self) -> bool {
        self.live.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_switch() {
        let clock = PlaybackClock::new();
        assert!(!clock.is_live_mode());
        clock.set_live_mode(true);
        assert!(clock.is_live_mode());
        assert!(PlaybackClock::live().is_live_mode());
    }
}
