//! Resubscribe backoff
//!
//! `delay = min(max_delay, base_delay + step * 2^attempt)`; with the
//! defaults that is 4s, 5s, 7s, 11s, 19s and then 32s for every later
//! attempt.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backoff settings for automatic resubscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResubscribeConfig {
    /// Fixed part of every delay
    pub base_delay_ms: u64,
    /// Doubled per attempt and added to the base
    pub step_ms: u64,
    /// Upper bound for any delay
    pub max_delay_ms: u64,
}

impl Default for ResubscribeConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 3000,
            step_ms: 1000,
            max_delay_ms: 32000,
        }
    }
}

impl ResubscribeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_base_delay_ms(mut self, ms: u64) -> Self {
        self.base_delay_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_step_ms(mut self, ms: u64) -> Self {
        self.step_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_max_delay_ms(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    /// Delay in milliseconds before resubscribe attempt `attempt` (0-based)
    #[must_use]
    pub fn delay_ms_for_attempt(&self, attempt: u32) -> u64 {
        let growth = 1u64
            .checked_shl(attempt)
            .map_or(u64::MAX, |factor| self.step_ms.saturating_mul(factor));
        self.base_delay_ms
            .saturating_add(growth)
            .min(self.max_delay_ms)
    }

    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.delay_ms_for_attempt(attempt))
    }
}
