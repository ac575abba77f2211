//! # The subscriber extension point.
//!
//! Implement [`Subscribe`] to consume simulation events: console output,
//! statistics collection, test assertions.
//!
//! A subscriber is driven by its own worker task fed from a bounded queue
//! owned by the [`SubscriberSet`](super::SubscriberSet). It never runs on a
//! task driver and never under the aggregate lock, so a slow subscriber only
//! delays itself. Events arrive one at a time, in bus order.
//!
//! ```rust
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use async_trait::async_trait;
//! use ressim::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct IterationCounter(AtomicU32);
//!
//! #[async_trait]
//! impl Subscribe for IterationCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::IterationCompleted {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "iteration-counter"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Consumer of simulation events.
///
/// `on_event` should not block the executor. Panics are caught and reported,
/// and the subscriber keeps receiving later events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name shown in drop and panic messages. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue length for this subscriber (at least 1 is used). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
