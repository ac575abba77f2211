//! # Snapshots and final reports.
//!
//! Plain data captured under the aggregate lock and rendered afterwards:
//! - [`StatusSnapshot`] task names grouped by status (monitor output)
//! - [`TaskReport`], [`ResourceReport`] per-entity end-of-run statistics
//! - [`Report`] everything above plus total running time
//!
//! `Display` impls produce the console layout used by the CLI:
//! ```text
//! monitor: [WAIT] t2
//!          [RUN]  t1 t3
//!          [IDLE]
//!
//! All Resources:
//!     A:  (maxAvail= 1, held= 0)
//!
//! All Tasks:
//! [0] t1 (IDLE, runTime= 50 ms, idleTime= 100 ms):
//!     A:  (need= 1, holding= 0)
//!     (Ran: 2 times, Waited: 12 ms)
//!
//! Running time= 431 ms
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::pool::Resource;
use crate::tasks::{Task, TaskStatus};

/// Task names partitioned by status at one instant.
///
/// Taken in a single critical section, so every task appears in exactly one
/// group. Names keep declaration order inside each group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Tasks trying to acquire.
    pub waiting: Vec<Arc<str>>,
    /// Tasks holding their demand.
    pub running: Vec<Arc<str>>,
    /// Tasks between iterations.
    pub idle: Vec<Arc<str>>,
}

impl StatusSnapshot {
    pub(crate) fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut snap = Self::default();
        for t in tasks {
            let group = match t.status() {
                TaskStatus::Waiting => &mut snap.waiting,
                TaskStatus::Running => &mut snap.running,
                TaskStatus::Idle => &mut snap.idle,
            };
            group.push(Arc::clone(t.name_arc()));
        }
        snap
    }

    /// Names in the group for `status`.
    pub fn group(&self, status: TaskStatus) -> &[Arc<str>] {
        match status {
            TaskStatus::Waiting => &self.waiting,
            TaskStatus::Running => &self.running,
            TaskStatus::Idle => &self.idle,
        }
    }

    /// Total number of tasks in the snapshot.
    pub fn len(&self) -> usize {
        self.waiting.len() + self.running.len() + self.idle.len()
    }

    /// True if no task is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = |f: &mut fmt::Formatter<'_>, names: &[Arc<str>]| -> fmt::Result {
            for n in names {
                write!(f, " {n}")?;
            }
            Ok(())
        };
        write!(f, "monitor: [WAIT]")?;
        line(f, &self.waiting)?;
        write!(f, "\n         [RUN] ")?;
        line(f, &self.running)?;
        write!(f, "\n         [IDLE]")?;
        line(f, &self.idle)
    }
}

/// Needed/held amounts of one demanded resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemandReport {
    /// Resource name.
    pub resource: Arc<str>,
    /// Units needed per iteration.
    pub needed: u32,
    /// Units held at report time.
    pub held: u32,
}

/// End-of-run statistics of one task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskReport {
    /// Declaration index.
    pub index: usize,
    /// Task name.
    pub name: Arc<str>,
    /// Status at report time.
    pub status: TaskStatus,
    /// Completed iterations.
    pub iterations_completed: u32,
    /// Total time spent waiting for resources.
    pub waited: Duration,
    /// Simulated work per iteration.
    pub busy: Duration,
    /// Idle period per iteration.
    pub idle: Duration,
    /// Per-resource needed/held amounts.
    pub demand: Vec<DemandReport>,
}

impl From<&Task> for TaskReport {
    fn from(t: &Task) -> Self {
        Self {
            index: t.id().index(),
            name: Arc::clone(t.name_arc()),
            status: t.status(),
            iterations_completed: t.iterations_completed(),
            waited: t.waited(),
            busy: t.busy(),
            idle: t.idle(),
            demand: t
                .demand()
                .iter()
                .zip(t.holding())
                .map(|(d, &held)| DemandReport {
                    resource: Arc::clone(&d.name),
                    needed: d.amount,
                    held,
                })
                .collect(),
        }
    }
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[{}] {} ({}, runTime= {} ms, idleTime= {} ms):",
            self.index,
            self.name,
            self.status,
            self.busy.as_millis(),
            self.idle.as_millis()
        )?;
        for d in &self.demand {
            writeln!(f, "\t{}:\t(need= {}, holding= {})", d.resource, d.needed, d.held)?;
        }
        write!(
            f,
            "\t(Ran: {} times, Waited: {} ms)",
            self.iterations_completed,
            self.waited.as_millis()
        )
    }
}

/// End-of-run state of one resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceReport {
    /// Resource name.
    pub name: Arc<str>,
    /// Total units.
    pub capacity: u32,
    /// Units held at report time.
    pub held: u32,
}

impl From<&Resource> for ResourceReport {
    fn from(r: &Resource) -> Self {
        Self {
            name: Arc::clone(r.name_arc()),
            capacity: r.capacity(),
            held: r.held(),
        }
    }
}

impl fmt::Display for ResourceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\t{}:\t(maxAvail= {}, held= {})",
            self.name, self.capacity, self.held
        )
    }
}

/// Final report of a simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    /// Resources in catalog order.
    pub resources: Vec<ResourceReport>,
    /// Tasks in declaration order.
    pub tasks: Vec<TaskReport>,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}

impl Report {
    /// Looks up a task by name.
    pub fn task(&self, name: &str) -> Option<&TaskReport> {
        self.tasks.iter().find(|t| &*t.name == name)
    }

    /// Looks up a resource by name.
    pub fn resource(&self, name: &str) -> Option<&ResourceReport> {
        self.resources.iter().find(|r| &*r.name == name)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "All Resources:")?;
        for r in &self.resources {
            writeln!(f, "{r}")?;
        }
        writeln!(f)?;
        writeln!(f, "All Tasks:")?;
        for t in &self.tasks {
            writeln!(f, "{t}")?;
            writeln!(f)?;
        }
        write!(f, "Running time= {} ms", self.elapsed.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<Arc<str>> {
        v.iter().map(|s| Arc::from(*s)).collect()
    }

    #[test]
    fn test_snapshot_display() {
        let snap = StatusSnapshot {
            waiting: names(&["t2"]),
            running: names(&["t1", "t3"]),
            idle: vec![],
        };
        assert_eq!(
            snap.to_string(),
            "monitor: [WAIT] t2\n         [RUN]  t1 t3\n         [IDLE]"
        );
        assert_eq!(snap.len(), 3);
        assert_eq!(&*snap.group(TaskStatus::Running)[1], "t3");
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = StatusSnapshot::default();
        assert!(snap.is_empty());
        assert_eq!(
            snap.to_string(),
            "monitor: [WAIT]\n         [RUN] \n         [IDLE]"
        );
    }

    #[test]
    fn test_task_report_display() {
        let report = TaskReport {
            index: 0,
            name: Arc::from("t1"),
            status: TaskStatus::Idle,
            iterations_completed: 2,
            waited: Duration::from_millis(12),
            busy: Duration::from_millis(50),
            idle: Duration::from_millis(100),
            demand: vec![DemandReport {
                resource: Arc::from("A"),
                needed: 1,
                held: 0,
            }],
        };
        assert_eq!(
            report.to_string(),
            "[0] t1 (IDLE, runTime= 50 ms, idleTime= 100 ms):\n\tA:\t(need= 1, holding= 0)\n\t(Ran: 2 times, Waited: 12 ms)"
        );
    }

    #[test]
    fn test_report_lookup_and_footer() {
        let report = Report {
            resources: vec![ResourceReport {
                name: Arc::from("A"),
                capacity: 1,
                held: 0,
            }],
            tasks: vec![],
            elapsed: Duration::from_millis(431),
        };
        assert_eq!(report.resource("A").map(|r| r.capacity), Some(1));
        assert!(report.task("t1").is_none());
        let text = report.to_string();
        assert!(text.starts_with("All Resources:\n\tA:\t(maxAvail= 1, held= 0)\n"));
        assert!(text.ends_with("Running time= 431 ms"));
    }
}
