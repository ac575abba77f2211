//! # Simulation events emitted by drivers, the monitor and the simulation.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Session events**: start/finish of the whole run, configuration warnings
//! - **Task lifecycle events**: WAIT / RUN / IDLE transitions and iteration counts
//! - **Monitor events**: periodic status snapshots and monitor shutdown
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task
//! name, iteration number and durations.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Lifecycle events are published while the aggregate lock is
//! held, so for one task their `seq` order is the order of its transitions.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use ressim::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::IterationCompleted)
//!     .with_task("t1")
//!     .with_iteration(3)
//!     .with_elapsed(Duration::from_millis(420));
//!
//! assert_eq!(ev.kind, EventKind::IterationCompleted);
//! assert_eq!(ev.task.as_deref(), Some("t1"));
//! assert_eq!(ev.iteration, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::report::StatusSnapshot;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of simulation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Session events ===
    /// Workers are about to start.
    ///
    /// Sets:
    /// - `reason`: `resources=N tasks=M iterations=K`
    SimulationStarted,

    /// A task demands more of a resource than its total capacity and can
    /// never run. Published once per offending demand before workers start.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `resource`: resource name
    /// - `reason`: `needs X, capacity Y`
    UnsatisfiableDemand,

    /// Every driver has exited and the monitor is stopped.
    ///
    /// Sets:
    /// - `elapsed`: wall-clock runtime of the session
    /// - `reason`: error label, only if the run failed
    SimulationFinished,

    // === Task lifecycle events ===
    /// First failed acquisition of a WAITING episode (wait timer started).
    ///
    /// Sets:
    /// - `task`: task name
    TaskWaiting,

    /// Task acquired its full demand (WAITING → RUNNING).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `waited`: time spent in this WAITING episode (zero if acquired at once)
    TaskAcquired,

    /// Task released its demand (RUNNING → IDLE).
    ///
    /// Sets:
    /// - `task`: task name
    TaskReleased,

    /// Task finished one WAIT → RUN → IDLE cycle.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `iteration`: iterations completed so far (1-based)
    /// - `elapsed`: time since the session started
    IterationCompleted,

    /// Task completed all its iterations; its driver exits.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `iteration`: total iterations
    TaskFinished,

    // === Monitor events ===
    /// Periodic status snapshot.
    ///
    /// Sets:
    /// - `snapshot`: task names grouped by status
    MonitorSnapshot,

    /// Monitor observed its stop signal and exited.
    MonitorStopped,
}

impl EventKind {
    /// Stable snake_case label, used in log lines.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::SimulationStarted => "simulation_started",
            EventKind::UnsatisfiableDemand => "unsatisfiable_demand",
            EventKind::SimulationFinished => "simulation_finished",
            EventKind::TaskWaiting => "task_waiting",
            EventKind::TaskAcquired => "task_acquired",
            EventKind::TaskReleased => "task_released",
            EventKind::IterationCompleted => "iteration_completed",
            EventKind::TaskFinished => "task_finished",
            EventKind::MonitorSnapshot => "monitor_snapshot",
            EventKind::MonitorStopped => "monitor_stopped",
        }
    }
}

/// Simulation event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Name of the resource, if applicable.
    pub resource: Option<Arc<str>>,
    /// Iteration count.
    pub iteration: Option<u32>,
    /// Time spent waiting in the episode that just ended.
    pub waited: Option<Duration>,
    /// Time since the session started (or total runtime).
    pub elapsed: Option<Duration>,
    /// Human-readable detail.
    pub reason: Option<Arc<str>>,
    /// Monitor snapshot.
    pub snapshot: Option<Arc<StatusSnapshot>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            resource: None,
            iteration: None,
            waited: None,
            elapsed: None,
            reason: None,
            snapshot: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a resource name.
    #[inline]
    pub fn with_resource(mut self, resource: impl Into<Arc<str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Attaches an iteration count.
    #[inline]
    pub fn with_iteration(mut self, n: u32) -> Self {
        self.iteration = Some(n);
        self
    }

    /// Attaches the duration of a finished wait.
    #[inline]
    pub fn with_waited(mut self, d: Duration) -> Self {
        self.waited = Some(d);
        self
    }

    /// Attaches an elapsed session time.
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed = Some(d);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a monitor snapshot.
    #[inline]
    pub fn with_snapshot(mut self, snapshot: StatusSnapshot) -> Self {
        self.snapshot = Some(Arc::new(snapshot));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::TaskWaiting);
        let b = Event::new(EventKind::TaskAcquired);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::new(EventKind::UnsatisfiableDemand)
            .with_task("t1")
            .with_resource("R")
            .with_reason("needs 10, capacity 5");
        assert_eq!(ev.resource.as_deref(), Some("R"));
        assert_eq!(ev.reason.as_deref(), Some("needs 10, capacity 5"));
        assert!(ev.snapshot.is_none());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(EventKind::TaskWaiting.as_label(), "task_waiting");
        assert_eq!(EventKind::MonitorSnapshot.as_label(), "monitor_snapshot");
    }
}
