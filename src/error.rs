//! Error types used by the simulator.
//!
//! This module defines the error enums of the crate:
//!
//! - [`ConfigError`]: invalid descriptors, rejected before any worker starts.
//! - [`PoolError`]: misuse of the name-based [`ResourcePool`](crate::ResourcePool) API.
//! - [`RuntimeError`]: failures of the concurrent runtime itself.
//! - [`InvariantViolation`]: an inconsistent aggregate observed under the lock.
//!
//! Every enum provides `as_label` (a stable snake_case label for logs).
//! A failed acquisition is **not** an error: `try_acquire` simply returns `false`.

use std::path::PathBuf;
use thiserror::Error;

/// # Errors raised while building a session from descriptors.
///
/// All of them are fatal: the simulation never starts with a partially
/// valid configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line of the configuration file is malformed.
    #[error("line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A task demands a resource that is not in the catalog.
    #[error("task {task:?} demands unknown resource {resource:?}")]
    UnknownResource {
        /// Task name.
        task: String,
        /// Missing resource name.
        resource: String,
    },

    /// A capacity, amount or duration is negative.
    #[error("negative {what}: {value}")]
    Negative {
        /// Description of the offending field.
        what: String,
        /// The rejected value.
        value: i64,
    },

    /// A quantity does not fit the simulator's integer range.
    #[error("{what} out of range: {value}")]
    OutOfRange {
        /// Description of the offending field.
        what: String,
        /// The rejected value.
        value: i64,
    },

    /// A task demands zero units of a resource.
    #[error("task {task:?} demands zero units of {resource:?}")]
    ZeroDemand {
        /// Task name.
        task: String,
        /// Resource name.
        resource: String,
    },

    /// Two resources share a name.
    #[error("duplicate resource {name:?}")]
    DuplicateResource {
        /// The repeated name.
        name: String,
    },

    /// Two tasks share a name.
    #[error("duplicate task {name:?}")]
    DuplicateTask {
        /// The repeated name.
        name: String,
    },

    /// A task lists the same resource twice in its demand.
    #[error("task {task:?} lists resource {resource:?} more than once")]
    DuplicateDemand {
        /// Task name.
        task: String,
        /// Repeated resource name.
        resource: String,
    },

    /// The iteration count must be at least one.
    #[error("iterations must be positive")]
    ZeroIterations,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use ressim::ConfigError;
    ///
    /// let err = ConfigError::ZeroIterations;
    /// assert_eq!(err.as_label(), "config_zero_iterations");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "config_io",
            ConfigError::Parse { .. } => "config_parse",
            ConfigError::UnknownResource { .. } => "config_unknown_resource",
            ConfigError::Negative { .. } => "config_negative",
            ConfigError::OutOfRange { .. } => "config_out_of_range",
            ConfigError::ZeroDemand { .. } => "config_zero_demand",
            ConfigError::DuplicateResource { .. } => "config_duplicate_resource",
            ConfigError::DuplicateTask { .. } => "config_duplicate_task",
            ConfigError::DuplicateDemand { .. } => "config_duplicate_demand",
            ConfigError::ZeroIterations => "config_zero_iterations",
        }
    }
}

/// # Errors produced by the name-based resource pool API.
///
/// The allocator works on validated ids and never produces these; they only
/// surface when callers query or mutate the pool by name, or pass a task id
/// that belongs to another session.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The name is not in the catalog.
    #[error("unknown resource {name:?}")]
    UnknownResource {
        /// Requested name.
        name: String,
    },

    /// Committing would push `held` above `capacity`.
    #[error("resource {name:?}: requested {requested}, only {available} available")]
    Insufficient {
        /// Resource name.
        name: String,
        /// Units requested.
        requested: u32,
        /// Units currently available.
        available: u32,
    },

    /// Reclaiming would push `held` below zero.
    #[error("resource {name:?}: cannot reclaim {requested}, only {held} held")]
    Underflow {
        /// Resource name.
        name: String,
        /// Units requested.
        requested: u32,
        /// Units currently held.
        held: u32,
    },

    /// The task id does not belong to this session.
    #[error("unknown task id {index}")]
    UnknownTask {
        /// Index carried by the id.
        index: usize,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::UnknownResource { .. } => "pool_unknown_resource",
            PoolError::Insufficient { .. } => "pool_insufficient",
            PoolError::Underflow { .. } => "pool_underflow",
            PoolError::UnknownTask { .. } => "pool_unknown_task",
        }
    }
}

/// # Errors produced by the simulation runtime.
///
/// Partial worker sets make the simulation meaningless, so any of these
/// aborts the whole session.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A task driver or the monitor did not finish normally.
    #[error("worker {worker:?} failed: {reason}")]
    WorkerFailed {
        /// Task name, or `"monitor"`.
        worker: String,
        /// Panic or abort description.
        reason: String,
    },

    /// The async runtime could not be created.
    #[error("failed to start runtime: {source}")]
    RuntimeStart {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use ressim::RuntimeError;
    ///
    /// let err = RuntimeError::WorkerFailed { worker: "t1".into(), reason: "panic".into() };
    /// assert_eq!(err.as_label(), "runtime_worker_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::WorkerFailed { .. } => "runtime_worker_failed",
            RuntimeError::RuntimeStart { .. } => "runtime_start",
        }
    }
}

/// # Inconsistency detected in the pool/task aggregate.
///
/// Never produced by a correct allocator; returned by
/// [`State::check_invariants`](crate::State::check_invariants).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// `held > capacity` for a resource.
    #[error("resource {resource:?}: held {held} exceeds capacity {capacity}")]
    HeldExceedsCapacity {
        /// Resource name.
        resource: String,
        /// Units held.
        held: u32,
        /// Total capacity.
        capacity: u32,
    },

    /// The pool's `held` differs from the sum of task holdings.
    #[error("resource {resource:?}: pool holds {held}, tasks hold {sum}")]
    HoldingMismatch {
        /// Resource name.
        resource: String,
        /// Pool-side held count.
        held: u32,
        /// Sum of task holdings.
        sum: u64,
    },

    /// A task holds something other than nothing or its full demand.
    #[error("task {task:?} holds {holding} of {resource:?}, demand is {demand}")]
    PartialHolding {
        /// Task name.
        task: String,
        /// Resource name.
        resource: String,
        /// Units held by the task.
        holding: u32,
        /// Units demanded.
        demand: u32,
    },
}

impl InvariantViolation {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            InvariantViolation::HeldExceedsCapacity { .. } => "invariant_held_exceeds_capacity",
            InvariantViolation::HoldingMismatch { .. } => "invariant_holding_mismatch",
            InvariantViolation::PartialHolding { .. } => "invariant_partial_holding",
        }
    }
}
