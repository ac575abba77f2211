//! # Retry policy for WAITING tasks.
//!
//! [`RetryPolicy`] decides when a task whose `try_acquire` failed checks again:
//! - after [`BackoffPolicy::next`] elapses (always), and
//! - as soon as any task releases resources, if `wake_on_release` is set.
//!
//! Both paths end in the same locked all-or-nothing check, so switching them
//! on or off never changes which commits are possible, only how quickly a
//! waiter notices freed capacity.

use crate::policies::backoff::BackoffPolicy;

/// When a WAITING task retries its acquisition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RetryPolicy {
    /// Delay between consecutive failed attempts.
    pub backoff: BackoffPolicy,
    /// Also wake on every release instead of waiting out the full delay.
    pub wake_on_release: bool,
}

impl RetryPolicy {
    /// Polling at the given fixed interval, no release wake-ups.
    pub fn polling(interval: std::time::Duration) -> Self {
        Self {
            backoff: BackoffPolicy::fixed(interval),
            wake_on_release: false,
        }
    }

    /// Returns the policy with release wake-ups toggled.
    pub fn with_wake_on_release(mut self, on: bool) -> Self {
        self.wake_on_release = on;
        self
    }
}
