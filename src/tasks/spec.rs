//! # Task and system descriptors.
//!
//! Defines [`TaskSpec`], the raw descriptor of one task, and [`SystemSpec`],
//! the full input of a simulation (resource catalog + task list).
//!
//! Descriptors are plain data. Nothing is validated here; validation happens
//! once, when a [`Session`](crate::Session) is built from them.
//!
//! ## Example
//! ```rust
//! use ressim::{SystemSpec, TaskSpec};
//!
//! let spec = SystemSpec::new()
//!     .with_resource("A", 1)
//!     .with_resource("B", 2)
//!     .with_task(TaskSpec::new("t1", 50, 100).with_demand("A", 1).with_demand("B", 1));
//!
//! assert_eq!(spec.tasks[0].demand.len(), 2);
//! ```

use crate::pool::ResourceSpec;

/// Task descriptor: `(name, busy_time_ms, idle_time_ms, demand)`.
///
/// Values are signed so the loader can pass through whatever it read and let
/// session construction report negative input precisely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSpec {
    /// Unique task name.
    pub name: String,
    /// Simulated work per iteration, in milliseconds.
    pub busy_ms: i64,
    /// Idle period per iteration, in milliseconds.
    pub idle_ms: i64,
    /// `(resource, amount)` pairs needed simultaneously, in declaration order.
    pub demand: Vec<(String, i64)>,
}

impl TaskSpec {
    /// Creates a descriptor with an empty demand.
    pub fn new(name: impl Into<String>, busy_ms: i64, idle_ms: i64) -> Self {
        Self {
            name: name.into(),
            busy_ms,
            idle_ms,
            demand: Vec::new(),
        }
    }

    /// Returns the descriptor with one more demanded resource.
    pub fn with_demand(mut self, resource: impl Into<String>, amount: i64) -> Self {
        self.demand.push((resource.into(), amount));
        self
    }
}

/// Complete simulation input: resources and tasks, both in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemSpec {
    /// Resource catalog.
    pub resources: Vec<ResourceSpec>,
    /// Task descriptors.
    pub tasks: Vec<TaskSpec>,
}

impl SystemSpec {
    /// Creates an empty system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the system with one more resource.
    pub fn with_resource(mut self, name: impl Into<String>, capacity: i64) -> Self {
        self.resources.push(ResourceSpec::new(name, capacity));
        self
    }

    /// Returns the system with one more task.
    pub fn with_task(mut self, task: TaskSpec) -> Self {
        self.tasks.push(task);
        self
    }
}
