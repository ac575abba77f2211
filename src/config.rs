//! # Simulation configuration.
//!
//! Provides [`Config`], the centralized runtime settings of a simulation.
//!
//! Config is used in two ways:
//! 1. **Session creation**: `Session::new(&spec, &config)` takes `iterations`
//! 2. **Simulation runtime**: monitor interval, retry policy and bus capacity
//!
//! ## Sentinel values
//! - `monitor_interval = 0s` → no monitor worker is started

use std::time::Duration;

use crate::policies::RetryPolicy;

/// Global configuration for a simulation run.
///
/// ## Field semantics
/// - `monitor_interval`: Delay between two monitor snapshots (`0s` = no monitor)
/// - `iterations`: Cycles every task runs before its driver exits (must be `> 0`)
/// - `retry`: How WAITING tasks retry acquisition
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over sprinkling sentinel
/// checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Delay between two monitor snapshots.
    ///
    /// The first snapshot is taken immediately when the monitor starts.
    pub monitor_interval: Duration,

    /// Number of WAIT → RUN → IDLE cycles per task.
    ///
    /// Validated when the session is built; `0` is a configuration error.
    pub iterations: u32,

    /// Retry behaviour for tasks whose acquisition failed.
    pub retry: RetryPolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the monitor interval as an `Option`.
    ///
    /// - `None` → monitor disabled
    /// - `Some(d)` → one snapshot every `d`
    #[inline]
    pub fn monitor_interval_opt(&self) -> Option<Duration> {
        if self.monitor_interval == Duration::ZERO {
            None
        } else {
            Some(self.monitor_interval)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `monitor_interval = 100ms`
    /// - `iterations = 1`
    /// - `retry = RetryPolicy::default()` (fixed 10ms polling)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            monitor_interval: Duration::from_millis(100),
            iterations: 1,
            retry: RetryPolicy::default(),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_disables_monitor() {
        let cfg = Config {
            monitor_interval: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.monitor_interval_opt(), None);
        assert_eq!(
            Config::default().monitor_interval_opt(),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
