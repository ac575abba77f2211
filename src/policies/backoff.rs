//! # Backoff between failed acquisition attempts.
//!
//! [`BackoffPolicy`] computes how long a WAITING task sleeps after its `n`-th
//! consecutive failed `try_acquire` (counting from 0 within one wait episode):
//! `first × factor^n`, clamped to `max`, then jittered.
//!
//! The default is `factor = 1.0` with no jitter, i.e. fixed-interval polling
//! every 10ms. Growth is opt-in.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use ressim::{BackoffPolicy, JitterPolicy};
//!
//! let fixed = BackoffPolicy::default();
//! assert_eq!(fixed.next(0), Duration::from_millis(10));
//! assert_eq!(fixed.next(50), Duration::from_millis(10));
//!
//! let growing = BackoffPolicy {
//!     first: Duration::from_millis(5),
//!     max: Duration::from_millis(40),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//! assert_eq!(growing.next(1), Duration::from_millis(10));
//! assert_eq!(growing.next(10), Duration::from_millis(40));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry delay policy for WAITING tasks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Multiplicative growth per consecutive failure (`1.0` = fixed interval).
    pub factor: f64,
    /// Randomization applied after clamping.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Fixed 10ms polling: `first = 10ms`, `factor = 1.0`, `max = 1s`, no jitter.
    fn default() -> Self {
        Self::fixed(Duration::from_millis(10))
    }
}

impl BackoffPolicy {
    /// Constant delay of `interval` between attempts.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            first: interval,
            max: interval.max(Duration::from_secs(1)),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay after failed attempt number `failures` (0-indexed).
    ///
    /// The base is derived from `failures` alone, so jitter never feeds back
    /// into later delays.
    pub fn next(&self, failures: u32) -> Duration {
        if self.factor == 1.0 {
            return self.jitter.apply(self.first.min(self.max));
        }
        let max_secs = self.max.as_secs_f64();
        let exp = failures.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fixed_polling() {
        let policy = BackoffPolicy::default();
        for failures in 0..20 {
            assert_eq!(policy.next(failures), Duration::from_millis(10));
        }
    }

    #[test]
    fn test_exponential_growth() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(10),
            max: Duration::from_secs(1),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(0), Duration::from_millis(10));
        assert_eq!(policy.next(1), Duration::from_millis(20));
        assert_eq!(policy.next(3), Duration::from_millis(80));
    }

    #[test]
    fn test_clamped_to_max() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(10),
            max: Duration::from_millis(50),
            factor: 3.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(5), Duration::from_millis(50));
        assert_eq!(policy.next(u32::MAX), Duration::from_millis(50));
    }

    #[test]
    fn test_first_above_max_is_clamped() {
        let policy = BackoffPolicy {
            first: Duration::from_secs(2),
            max: Duration::from_secs(1),
            factor: 1.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(0), Duration::from_secs(1));
    }

    #[test]
    fn test_fixed_keeps_long_intervals() {
        let policy = BackoffPolicy::fixed(Duration::from_secs(3));
        assert_eq!(policy.next(7), Duration::from_secs(3));
    }

    #[test]
    fn test_jitter_stays_below_base() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(20),
            max: Duration::from_secs(1),
            factor: 1.0,
            jitter: JitterPolicy::Full,
        };
        for failures in 0..50 {
            assert!(policy.next(failures) <= Duration::from_millis(20));
        }
    }
}
