//! # SubscriberSet: fan-out of simulation events
//!
//! [`SubscriberSet`] hands each [`Event`] to every subscriber without waiting
//! for any of them. The simulation's event listener is its only caller.
//!
//! - `emit` never blocks: each subscriber has its own bounded queue.
//! - Events reach one subscriber in bus order.
//! - A panicking subscriber is reported on stderr and keeps receiving events.
//! - `shutdown` drains every queue, so console output is complete before the
//!   final report is printed.
//! - A full queue drops the event for that subscriber only; the loss is
//!   counted in [`SubscriberSet::dropped`].
//!
//! ```text
//!   listener ── emit(&Event) ──► Arc<Event>
//!                                   ├──► [queue 1] ──► worker 1 ──► on_event()
//!                                   └──► [queue N] ──► worker N ──► on_event()
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};

use crate::events::Event;

use super::Subscribe;

struct Slot {
    name: &'static str,
    queue: mpsc::Sender<Arc<Event>>,
    worker: JoinHandle<()>,
}

/// Subscribers with their queues and worker tasks.
pub struct SubscriberSet {
    slots: Vec<Slot>,
    dropped: AtomicU64,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let slots = subs.into_iter().map(spawn_worker).collect();
        Self {
            slots,
            dropped: AtomicU64::new(0),
        }
    }

    /// Queues `event` for every subscriber.
    pub fn emit(&self, event: &Event) {
        if self.slots.is_empty() {
            return;
        }
        let ev = Arc::new(event.clone());
        for slot in &self.slots {
            let why = match slot.queue.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "queue full",
                Err(TrySendError::Closed(_)) => "worker gone",
            };
            self.dropped.fetch_add(1, Ordering::Relaxed);
            eprintln!(
                "[ressim] {} event #{} not delivered to '{}': {why}",
                ev.kind.as_label(),
                ev.seq,
                slot.name
            );
        }
    }

    /// Closes every queue and waits until each worker has handled what was queued.
    pub async fn shutdown(self) {
        let workers: Vec<_> = self
            .slots
            .into_iter()
            .map(|slot| {
                drop(slot.queue);
                slot.worker
            })
            .collect();
        for w in workers {
            let _ = w.await;
        }
    }

    /// Events not delivered because a queue was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

fn spawn_worker(sub: Arc<dyn Subscribe>) -> Slot {
    let name = sub.name();
    let (queue, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
    let worker = tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
                .catch_unwind()
                .await;
            if handled.is_err() {
                eprintln!(
                    "[ressim] subscriber '{name}' panicked on {} event #{}",
                    ev.kind.as_label(),
                    ev.seq
                );
            }
        }
    });
    Slot {
        name,
        queue,
        worker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Kinds(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Kinds {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }
    }

    struct Panics;

    #[async_trait]
    impl Subscribe for Panics {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber failure");
        }

        fn name(&self) -> &'static str {
            "panics"
        }
    }

    struct Slow(tokio::sync::Notify);

    #[async_trait]
    impl Subscribe for Slow {
        async fn on_event(&self, _ev: &Event) {
            self.0.notified().await;
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_order_kept_and_drained_on_shutdown() {
        let sink = Arc::new(Kinds::default());
        let set = SubscriberSet::new(vec![sink.clone() as Arc<dyn Subscribe>]);
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::TaskWaiting));
        set.emit(&Event::new(EventKind::TaskAcquired));
        set.emit(&Event::new(EventKind::TaskReleased));
        set.shutdown().await;

        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![
                EventKind::TaskWaiting,
                EventKind::TaskAcquired,
                EventKind::TaskReleased
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_affect_others() {
        let sink = Arc::new(Kinds::default());
        let set = SubscriberSet::new(vec![Arc::new(Panics), sink.clone() as Arc<dyn Subscribe>]);

        set.emit(&Event::new(EventKind::MonitorStopped));
        set.emit(&Event::new(EventKind::SimulationFinished));
        set.shutdown().await;

        assert_eq!(sink.0.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_full_queue_counts_drops() {
        let set = SubscriberSet::new(vec![Arc::new(Slow(tokio::sync::Notify::new()))]);

        for _ in 0..5 {
            set.emit(&Event::new(EventKind::TaskWaiting));
        }
        // The worker has not run yet: one event queued, the rest dropped.
        assert_eq!(set.dropped(), 4);
    }

    #[tokio::test]
    async fn test_empty_set_ignores_events() {
        let set = SubscriberSet::new(Vec::new());
        assert!(set.is_empty());
        set.emit(&Event::new(EventKind::SimulationStarted));
        assert_eq!(set.dropped(), 0);
        set.shutdown().await;
    }
}
