//! # Session: the pool/task aggregate behind one lock.
//!
//! [`State`] owns the [`ResourcePool`] and every [`Task`]. [`Session`] wraps it
//! in a single `tokio::sync::Mutex` (the aggregate lock) and adds the release
//! notifier used by waiters that opted into wake-ups.
//!
//! ## Architecture
//! ```text
//!                    Arc<Session>
//!         ┌──────────────┼──────────────┐
//!         ▼              ▼              ▼
//!    TaskDriver 1   TaskDriver N     Monitor
//!         │              │              │
//!         └──── lock().await (one Mutex) ┘
//!                        ▼
//!              State { pool, tasks }
//! ```
//!
//! ## Rules
//! - One lock for the whole aggregate: acquisition checks and updates several
//!   resources and a task as one unit.
//! - Critical sections never await anything but the lock itself.
//! - A task is only mutated by its own driver; everyone may read under the lock.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard, Notify};

use crate::config::Config;
use crate::core::allocator;
use crate::error::{ConfigError, InvariantViolation, PoolError};
use crate::pool::ResourcePool;
use crate::report::{Report, ResourceReport, StatusSnapshot, TaskReport};
use crate::tasks::{SystemSpec, Task, TaskId};

/// A demand that can never be met: `needed > capacity`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unsatisfiable {
    /// Task name.
    pub task: String,
    /// Resource name.
    pub resource: String,
    /// Units demanded.
    pub needed: u32,
    /// Total capacity of the resource.
    pub capacity: u32,
}

/// Resource pool and task table: everything the aggregate lock protects.
#[derive(Clone, Debug)]
pub struct State {
    pool: ResourcePool,
    tasks: Vec<Task>,
}

impl State {
    /// Validates descriptors and builds the aggregate.
    pub fn new(spec: &SystemSpec, iterations: u32) -> Result<Self, ConfigError> {
        if iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        let pool = ResourcePool::from_specs(&spec.resources)?;

        let mut seen = HashSet::with_capacity(spec.tasks.len());
        let mut tasks = Vec::with_capacity(spec.tasks.len());
        for (i, ts) in spec.tasks.iter().enumerate() {
            if !seen.insert(ts.name.as_str()) {
                return Err(ConfigError::DuplicateTask {
                    name: ts.name.clone(),
                });
            }
            tasks.push(Task::from_spec(TaskId(i), ts, &pool, iterations)?);
        }
        Ok(Self { pool, tasks })
    }

    /// The resource pool.
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// All tasks in declaration order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// One task by id; `None` for an id from another session.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.0)
    }

    // Drivers only hold ids minted by this state, so these two index directly.
    pub(crate) fn task_mut(&mut self, id: TaskId) -> &mut Task {
        &mut self.tasks[id.0]
    }

    /// Borrows the pool and one task mutably at the same time.
    pub(crate) fn split(&mut self, id: TaskId) -> (&mut ResourcePool, &mut Task) {
        (&mut self.pool, &mut self.tasks[id.0])
    }

    /// All-or-nothing acquisition of the task's full demand.
    ///
    /// ### Errors
    /// [`PoolError::UnknownTask`] if `id` is not one of this state's tasks.
    pub fn try_acquire(&mut self, id: TaskId) -> Result<bool, PoolError> {
        let (pool, task) = self.checked_split(id)?;
        Ok(allocator::try_acquire(pool, task))
    }

    /// Returns everything the task holds to the pool.
    ///
    /// ### Errors
    /// [`PoolError::UnknownTask`] if `id` is not one of this state's tasks.
    pub fn release(&mut self, id: TaskId) -> Result<(), PoolError> {
        let (pool, task) = self.checked_split(id)?;
        allocator::release(pool, task);
        Ok(())
    }

    fn checked_split(
        &mut self,
        id: TaskId,
    ) -> Result<(&mut ResourcePool, &mut Task), PoolError> {
        let task = self
            .tasks
            .get_mut(id.0)
            .ok_or(PoolError::UnknownTask { index: id.0 })?;
        Ok((&mut self.pool, task))
    }

    /// Task names grouped by status.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::from_tasks(&self.tasks)
    }

    /// Per-resource and per-task statistics.
    pub fn report(&self, elapsed: Duration) -> Report {
        Report {
            resources: self.pool.iter().map(ResourceReport::from).collect(),
            tasks: self.tasks.iter().map(TaskReport::from).collect(),
            elapsed,
        }
    }

    /// Demands exceeding a resource's total capacity.
    pub fn unsatisfiable(&self) -> Vec<Unsatisfiable> {
        let mut out = Vec::new();
        for t in &self.tasks {
            for d in t.demand() {
                let capacity = self.pool.get(d.resource).capacity();
                if d.amount > capacity {
                    out.push(Unsatisfiable {
                        task: t.name().to_string(),
                        resource: d.name.to_string(),
                        needed: d.amount,
                        capacity,
                    });
                }
            }
        }
        out
    }

    /// Checks the aggregate invariants.
    ///
    /// - `held <= capacity` for every resource
    /// - `holding ∈ {0, demand}` for every task and resource
    /// - `Σ holding == held` for every resource
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut sums = vec![0u64; self.pool.len()];
        for t in &self.tasks {
            for (d, &h) in t.demand().iter().zip(t.holding()) {
                if h != 0 && h != d.amount {
                    return Err(InvariantViolation::PartialHolding {
                        task: t.name().to_string(),
                        resource: d.name.to_string(),
                        holding: h,
                        demand: d.amount,
                    });
                }
                sums[d.resource.index()] += u64::from(h);
            }
        }
        for (r, sum) in self.pool.iter().zip(sums) {
            if r.held() > r.capacity() {
                return Err(InvariantViolation::HeldExceedsCapacity {
                    resource: r.name().to_string(),
                    held: r.held(),
                    capacity: r.capacity(),
                });
            }
            if u64::from(r.held()) != sum {
                return Err(InvariantViolation::HoldingMismatch {
                    resource: r.name().to_string(),
                    held: r.held(),
                    sum,
                });
            }
        }
        Ok(())
    }
}

/// Shared simulation state: the aggregate, its lock and the release notifier.
///
/// Shared by `Arc` between every driver and the monitor; never cloned.
#[derive(Debug)]
pub struct Session {
    state: Mutex<State>,
    released: Notify,
    task_count: usize,
}

impl Session {
    /// Validates descriptors against `cfg` and builds the session.
    ///
    /// # Example
    /// ```rust
    /// use ressim::{Config, Session, SystemSpec, TaskSpec};
    ///
    /// let spec = SystemSpec::new()
    ///     .with_resource("A", 1)
    ///     .with_task(TaskSpec::new("t1", 10, 10).with_demand("B", 1));
    ///
    /// let err = Session::new(&spec, &Config::default()).unwrap_err();
    /// assert_eq!(err.as_label(), "config_unknown_resource");
    /// ```
    pub fn new(spec: &SystemSpec, cfg: &Config) -> Result<Self, ConfigError> {
        let state = State::new(spec, cfg.iterations)?;
        Ok(Self {
            task_count: state.tasks.len(),
            state: Mutex::new(state),
            released: Notify::new(),
        })
    }

    /// Takes the aggregate lock.
    pub async fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().await
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.task_count
    }

    /// Ids of all tasks in declaration order.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + use<> {
        (0..self.task_count).map(TaskId)
    }

    /// Locks and runs [`State::try_acquire`].
    pub async fn try_acquire(&self, id: TaskId) -> Result<bool, PoolError> {
        self.lock().await.try_acquire(id)
    }

    /// Locks, runs [`State::release`] and wakes release waiters.
    pub async fn release(&self, id: TaskId) -> Result<(), PoolError> {
        self.lock().await.release(id)?;
        self.notify_released();
        Ok(())
    }

    /// Locks and takes a status snapshot.
    pub async fn snapshot(&self) -> StatusSnapshot {
        self.lock().await.snapshot()
    }

    /// Locks and builds a report.
    pub async fn report(&self, elapsed: Duration) -> Report {
        self.lock().await.report(elapsed)
    }

    /// Locks and checks the aggregate invariants.
    pub async fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.lock().await.check_invariants()
    }

    pub(crate) fn released(&self) -> &Notify {
        &self.released
    }

    pub(crate) fn notify_released(&self) {
        self.released.notify_waiters();
    }
}
