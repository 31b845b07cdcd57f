//! Client sync policy: polling cadence and debounced autosave.
//!
//! The policy is served to clients so every front end polls and saves on the
//! same schedule.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 4000;
pub const DEFAULT_POLL_JITTER_MS: u64 = 500;
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPolicy {
    pub poll_interval_ms: u64,
    pub poll_jitter_ms: u64,
    pub autosave_debounce_ms: u64,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_jitter_ms: DEFAULT_POLL_JITTER_MS,
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
        }
    }
}

impl SyncPolicy {
    /// Delay before the next poll: the interval plus a uniform jitter.
    pub fn next_poll_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter = if self.poll_jitter_ms == 0 {
            0
        } else {
            rng.random_range(0..=self.poll_jitter_ms)
        };
        Duration::from_millis(self.poll_interval_ms + jitter)
    }

    /// [`Self::next_poll_delay`] drawn from the thread-local generator.
    pub fn sample_poll_delay(&self) -> Duration {
        self.next_poll_delay(&mut rand::rng())
    }
}
