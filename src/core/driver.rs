//! # TaskDriver: one task's life cycle.
//!
//! Drives a single [`Task`](crate::Task) through its iterations, taking the
//! aggregate lock only for the short transitions between phases.
//!
//! ## Event flow
//! ```text
//! WAITING ──try_acquire ok──► TaskAcquired ──► RUNNING ── sleep(busy)
//!    ▲     └─ fail ─► TaskWaiting (first failure only) ─► retry delay ─┐
//!    │                                                                  │
//!    │ ◄────────────────────────────────────────────────────────────────┘
//!    │
//! RUNNING ──release──► TaskReleased ──► IDLE ── sleep(idle)
//!    │
//! IDLE ──► IterationCompleted ──► WAITING   (or TaskFinished and exit)
//! ```
//!
//! ## Rules
//! - Sleeps (busy, idle, retry delay) happen **outside** the lock.
//! - The wait timer starts on the first failed attempt and stops on success.
//! - On the final iteration the task stays IDLE and the driver exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time, time::Instant};

use crate::{
    core::{allocator, state::Session},
    events::{Bus, Event, EventKind},
    policies::RetryPolicy,
    tasks::{Task, TaskId, TaskStatus},
};

/// Runs one task to completion.
pub(crate) struct TaskDriver {
    id: TaskId,
    name: Arc<str>,
    busy: Duration,
    idle: Duration,
    session: Arc<Session>,
    retry: RetryPolicy,
    bus: Bus,
    started: Instant,
}

impl TaskDriver {
    /// Creates a driver for `task`; `started` is the session clock origin.
    pub(crate) fn new(
        task: &Task,
        session: Arc<Session>,
        retry: RetryPolicy,
        bus: Bus,
        started: Instant,
    ) -> Self {
        Self {
            id: task.id(),
            name: Arc::clone(task.name_arc()),
            busy: task.busy(),
            idle: task.idle(),
            session,
            retry,
            bus,
            started,
        }
    }

    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Runs every iteration, then returns.
    pub(crate) async fn run(self) {
        loop {
            self.acquire().await;
            time::sleep(self.busy).await;
            self.release().await;
            time::sleep(self.idle).await;
            if self.complete_iteration().await {
                break;
            }
        }
    }

    /// Retries until the whole demand is granted; leaves the task RUNNING.
    async fn acquire(&self) {
        let mut wait_started: Option<Instant> = None;
        let mut failures: u32 = 0;

        loop {
            let notified = self.session.released().notified();
            tokio::pin!(notified);
            {
                let mut st = self.session.lock().await;
                let (pool, task) = st.split(self.id);
                if allocator::try_acquire(pool, task) {
                    let waited = wait_started.map(|t| t.elapsed()).unwrap_or_default();
                    task.add_wait(waited);
                    task.set_status(TaskStatus::Running);
                    self.bus.publish(
                        Event::new(EventKind::TaskAcquired)
                            .with_task(Arc::clone(&self.name))
                            .with_waited(waited),
                    );
                    debug_assert_eq!(st.check_invariants(), Ok(()));
                    return;
                }
                if wait_started.is_none() {
                    wait_started = Some(Instant::now());
                    task.set_status(TaskStatus::Waiting);
                    self.bus.publish(
                        Event::new(EventKind::TaskWaiting).with_task(Arc::clone(&self.name)),
                    );
                }
                // Registered before the lock drops so a release in between is not missed.
                if self.retry.wake_on_release {
                    notified.as_mut().enable();
                }
            }

            let delay = self.retry.backoff.next(failures);
            failures = failures.saturating_add(1);

            if self.retry.wake_on_release {
                select! {
                    _ = time::sleep(delay) => {}
                    _ = &mut notified => {}
                }
            } else {
                time::sleep(delay).await;
            }
        }
    }

    /// Returns all held units and moves the task to IDLE.
    async fn release(&self) {
        {
            let mut st = self.session.lock().await;
            let (pool, task) = st.split(self.id);
            allocator::release(pool, task);
            task.set_status(TaskStatus::Idle);
            self.bus
                .publish(Event::new(EventKind::TaskReleased).with_task(Arc::clone(&self.name)));
            debug_assert_eq!(st.check_invariants(), Ok(()));
        }
        self.session.notify_released();
    }

    /// Counts the finished iteration. Returns `true` when the target is reached.
    async fn complete_iteration(&self) -> bool {
        let mut st = self.session.lock().await;
        let task = st.task_mut(self.id);
        let n = task.complete_iteration();
        self.bus.publish(
            Event::new(EventKind::IterationCompleted)
                .with_task(Arc::clone(&self.name))
                .with_iteration(n)
                .with_elapsed(self.started.elapsed()),
        );

        if task.is_finished() {
            self.bus.publish(
                Event::new(EventKind::TaskFinished)
                    .with_task(Arc::clone(&self.name))
                    .with_iteration(n),
            );
            return true;
        }
        task.set_status(TaskStatus::Waiting);
        false
    }
}
