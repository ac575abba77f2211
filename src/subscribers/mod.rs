//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`] for events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   TaskDriver / Monitor ── publish(Event) ──► Bus ──► event listener
//!                                                          │
//!                                                          ▼
//!                                                   SubscriberSet::emit
//!                                                 ┌────────┴────────┐
//!                                                 ▼                 ▼
//!                                             LogWriter          Custom ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
