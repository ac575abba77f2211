//! # Event bus for broadcasting simulation events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that lets task
//! drivers, the monitor and the simulation publish without blocking.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                    Subscriber (one):
//!   Driver 1 ──┐
//!   Driver 2 ──┼──────► Bus ───────► event listener ────► SubscriberSet
//!   Driver N ──┤  (broadcast chan)   (in Simulation)
//!   Monitor  ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: drivers publish while holding the aggregate
//!   lock, so `publish()` must never wait.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for simulation events.
///
/// Cheap to clone (holds an `Arc`-backed sender); every driver gets its own clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers the event is dropped; this still returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
