//! # Monitor: periodic status snapshots.
//!
//! Publishes a [`StatusSnapshot`](crate::StatusSnapshot) every
//! `monitor_interval` until stopped.
//!
//! ```text
//! start() ── lock ─► snapshot #1 ─► publish ── unlock
//!    │
//!    └─ spawn loop { select!(sleep(interval), cancelled) ─► lock ─► snapshot ─► publish }
//!
//! MonitorHandle::stop() ── lock ─► token.cancel() ── unlock ─► join
//! ```
//!
//! ## Rules
//! - Each snapshot is taken and published under the aggregate lock, so it is
//!   a consistent cut and never interleaves with another snapshot.
//! - Cancellation is issued under the same lock, so it never lands in the
//!   middle of a snapshot.
//! - Dropping the [`MonitorHandle`] cancels the loop too, so the monitor
//!   never outlives the run that started it.

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, task::JoinHandle, time};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{
    core::state::Session,
    error::RuntimeError,
    events::{Bus, Event, EventKind},
};

/// Snapshot publisher.
pub(crate) struct Monitor {
    session: Arc<Session>,
    bus: Bus,
    interval: Duration,
}

/// Running monitor; stop it with [`MonitorHandle::stop`].
///
/// Dropped without `stop`, it cancels the loop without waiting for it.
pub(crate) struct MonitorHandle {
    session: Arc<Session>,
    guard: DropGuard,
    join: JoinHandle<u64>,
}

impl Monitor {
    pub(crate) fn new(session: Arc<Session>, bus: Bus, interval: Duration) -> Self {
        Self {
            session,
            bus,
            interval,
        }
    }

    /// Publishes the first snapshot, then keeps publishing in the background.
    pub(crate) async fn start(self) -> MonitorHandle {
        self.publish_snapshot().await;

        let token = CancellationToken::new();
        let session = Arc::clone(&self.session);
        let join = tokio::spawn(self.run(token.clone()));
        MonitorHandle {
            session,
            guard: token.drop_guard(),
            join,
        }
    }

    async fn run(self, token: CancellationToken) -> u64 {
        let mut taken: u64 = 1;
        loop {
            select! {
                _ = time::sleep(self.interval) => {}
                _ = token.cancelled() => break,
            }
            {
                let st = self.session.lock().await;
                if token.is_cancelled() {
                    break;
                }
                self.bus
                    .publish(Event::new(EventKind::MonitorSnapshot).with_snapshot(st.snapshot()));
            }
            taken += 1;
        }
        self.bus.publish(Event::new(EventKind::MonitorStopped));
        taken
    }

    async fn publish_snapshot(&self) {
        let st = self.session.lock().await;
        self.bus
            .publish(Event::new(EventKind::MonitorSnapshot).with_snapshot(st.snapshot()));
    }
}

impl MonitorHandle {
    /// Cancels under the aggregate lock and waits for the loop to exit.
    ///
    /// Returns the number of snapshots published.
    pub(crate) async fn stop(self) -> Result<u64, RuntimeError> {
        let Self {
            session,
            guard,
            join,
        } = self;
        {
            let _st = session.lock().await;
            guard.disarm().cancel();
        }
        join.await.map_err(|e| RuntimeError::WorkerFailed {
            worker: "monitor".to_string(),
            reason: e.to_string(),
        })
    }
}
