//! Pacing policy for outbound messages.
//!
//! Computation advances every step; only the observable pacing is
//! throttled. After the message for the n-th term (1-based) is sent, the
//! driver pauses if n is a multiple of `pause_every`.

use std::time::Duration;

use crate::config::CadenceConfig;

/// When and how long to pause between messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    every: u64,
    pause: Duration,
}

impl Cadence {
    /// Pause for `pause` after every `every`-th message. Zero never pauses.
    pub const fn new(every: u64, pause: Duration) -> Self {
        Self { every, pause }
    }

    /// Cadence from the `cadence` configuration section.
    pub const fn from_config(config: &CadenceConfig) -> Self {
        Self::new(config.pause_every, Duration::from_millis(config.pause_ms))
    }

    /// Whether to pause after the message reporting `terms` summed terms.
    pub const fn should_pause(&self, terms: u64) -> bool {
        self.every != 0 && terms != 0 && terms % self.every == 0
    }

    /// Length of each pause.
    pub const fn pause(&self) -> Duration {
        self.pause
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::from_config(&CadenceConfig::default())
    }
}
