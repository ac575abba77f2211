//! # Task descriptors and task values.
//!
//! This module provides the task-related types:
//! - [`TaskSpec`] - raw descriptor of one task
//! - [`SystemSpec`] - resources + tasks, the whole simulation input
//! - [`Task`] - validated task with holdings, statistics and [`TaskStatus`]

mod spec;
mod task;

pub use spec::{SystemSpec, TaskSpec};
pub use task::{Demand, Task, TaskId, TaskStatus};
