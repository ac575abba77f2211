//! Retry policies.
//!
//! This module groups the knobs that control **how long** a WAITING task
//! sleeps before checking its demand again.
//!
//! ## Contents
//! - [`RetryPolicy`] backoff + optional wake-up on release
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization to keep retries from lining up
//!
//! ## Quick wiring
//! ```text
//! Config { retry: RetryPolicy, .. }
//!      └─► core::driver::TaskDriver uses:
//!           - backoff.next(failures) to schedule the next attempt
//!           - wake_on_release to also wait on the session's release notifier
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → fixed 10ms interval, no jitter.
//! - `wake_on_release = false` (plain polling).

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
