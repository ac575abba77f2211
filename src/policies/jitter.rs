//! # Jitter for acquisition retry delays.
//!
//! [`JitterPolicy`] spreads out the retries of tasks that failed to acquire at
//! the same moment (typically right after a release), so they do not all hit
//! the aggregate lock in the same instant.
//!
//! - [`JitterPolicy::None`]: exact delay (the default; matches fixed polling)
//! - [`JitterPolicy::Full`]: random delay in `[0, delay]`
//! - [`JitterPolicy::Equal`]: `delay/2 + random[0, delay/2]`
//!
//! Randomization works in microseconds: retry delays are in the
//! millisecond range and whole-millisecond steps would be too coarse.

use rand::Rng;
use std::time::Duration;

/// Randomization applied to each retry delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    #[default]
    None,

    /// Full jitter: random delay in `[0, delay]`.
    Full,

    /// Equal jitter: `delay/2 + random[0, delay/2]`.
    ///
    /// Keeps at least half of the delay.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => {
                let us = micros(delay);
                Duration::from_micros(rand::rng().random_range(0..=us))
            }
            JitterPolicy::Equal => {
                let half = micros(delay) / 2;
                let extra = if half == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=half)
                };
                Duration::from_micros(half + extra)
            }
        }
    }
}

fn micros(delay: Duration) -> u64 {
    u64::try_from(delay.as_micros()).unwrap_or(u64::MAX)
}
