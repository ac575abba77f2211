//! # Task value: identity, demand, holdings, statistics and status.
//!
//! A [`Task`] is created once from its [`TaskSpec`] before any driver starts.
//! It lives in the session aggregate and is only mutated by its own driver
//! (through the allocator and the status/statistics setters), always under
//! the aggregate lock.
//!
//! ## Holding rule
//! For every demanded resource `r`, `holding[r]` is either `0` or exactly
//! `demand[r]`. Only the allocator writes holdings, and it writes all of them
//! in one critical section.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::pool::{ResourceId, ResourcePool, quantity};
use crate::tasks::spec::TaskSpec;

/// Dense index of a task inside its session, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    /// Position of the task in declaration order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Lifecycle status of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Trying to acquire its demand.
    Waiting,
    /// Holding its full demand and doing simulated work.
    Running,
    /// Released everything; sleeping before the next iteration.
    Idle,
}

impl TaskStatus {
    /// Short label used in monitor output.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskStatus::Waiting => "WAIT",
            TaskStatus::Running => "RUN",
            TaskStatus::Idle => "IDLE",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One demanded resource with the amount needed.
#[derive(Clone, Debug)]
pub struct Demand {
    /// Resource id in the session pool.
    pub resource: ResourceId,
    /// Resource name.
    pub name: Arc<str>,
    /// Units needed (always positive).
    pub amount: u32,
}

/// A simulated task.
#[derive(Clone, Debug)]
pub struct Task {
    id: TaskId,
    name: Arc<str>,
    demand: Vec<Demand>,
    holding: Vec<u32>,
    status: TaskStatus,
    iterations_completed: u32,
    target_iterations: u32,
    busy: Duration,
    idle: Duration,
    waited: Duration,
}

impl Task {
    /// Validates a descriptor against the pool and builds the task.
    ///
    /// Rejects unknown resources, duplicate demand entries, negative times and
    /// non-positive amounts.
    pub(crate) fn from_spec(
        id: TaskId,
        spec: &TaskSpec,
        pool: &ResourcePool,
        target_iterations: u32,
    ) -> Result<Self, ConfigError> {
        let busy = quantity(|| format!("busy time of task {:?}", spec.name), spec.busy_ms)?;
        let idle = quantity(|| format!("idle time of task {:?}", spec.name), spec.idle_ms)?;

        let mut demand: Vec<Demand> = Vec::with_capacity(spec.demand.len());
        for (resource, amount) in &spec.demand {
            let rid = pool
                .id(resource)
                .map_err(|_| ConfigError::UnknownResource {
                    task: spec.name.clone(),
                    resource: resource.clone(),
                })?;
            let amount = quantity(
                || format!("amount of {resource:?} for task {:?}", spec.name),
                *amount,
            )?;
            if amount == 0 {
                return Err(ConfigError::ZeroDemand {
                    task: spec.name.clone(),
                    resource: resource.clone(),
                });
            }
            if demand.iter().any(|d| d.resource == rid) {
                return Err(ConfigError::DuplicateDemand {
                    task: spec.name.clone(),
                    resource: resource.clone(),
                });
            }
            demand.push(Demand {
                resource: rid,
                name: Arc::clone(pool.get(rid).name_arc()),
                amount,
            });
        }

        let holding = vec![0; demand.len()];
        Ok(Self {
            id,
            name: Arc::from(spec.name.as_str()),
            demand,
            holding,
            status: TaskStatus::Waiting,
            iterations_completed: 0,
            target_iterations,
            busy: Duration::from_millis(u64::from(busy)),
            idle: Duration::from_millis(u64::from(idle)),
            waited: Duration::ZERO,
        })
    }

    /// Task id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    /// Demanded resources in declaration order.
    pub fn demand(&self) -> &[Demand] {
        &self.demand
    }

    /// Units currently held, parallel to [`Task::demand`].
    pub fn holding(&self) -> &[u32] {
        &self.holding
    }

    /// Units of the named resource currently held (`None` if not demanded).
    pub fn holding_of(&self, resource: &str) -> Option<u32> {
        self.demand
            .iter()
            .position(|d| &*d.name == resource)
            .map(|i| self.holding[i])
    }

    /// True if the task holds nothing at all.
    pub fn holds_nothing(&self) -> bool {
        self.holding.iter().all(|&h| h == 0)
    }

    /// True if the task holds exactly its full demand.
    pub fn holds_full_demand(&self) -> bool {
        self.demand
            .iter()
            .zip(&self.holding)
            .all(|(d, &h)| h == d.amount)
    }

    /// Current status.
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Completed iterations.
    pub fn iterations_completed(&self) -> u32 {
        self.iterations_completed
    }

    /// Iterations to run before the driver exits.
    pub fn target_iterations(&self) -> u32 {
        self.target_iterations
    }

    /// True once all iterations are done.
    pub fn is_finished(&self) -> bool {
        self.iterations_completed >= self.target_iterations
    }

    /// Simulated work per iteration.
    pub fn busy(&self) -> Duration {
        self.busy
    }

    /// Idle period per iteration.
    pub fn idle(&self) -> Duration {
        self.idle
    }

    /// Total time spent waiting for resources.
    pub fn waited(&self) -> Duration {
        self.waited
    }

    pub(crate) fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub(crate) fn add_wait(&mut self, d: Duration) {
        self.waited += d;
    }

    /// Counts one finished cycle and returns the new total.
    pub(crate) fn complete_iteration(&mut self) -> u32 {
        self.iterations_completed += 1;
        self.iterations_completed
    }

    pub(crate) fn holding_mut(&mut self) -> &mut [u32] {
        &mut self.holding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::ResourceSpec;

    fn pool() -> ResourcePool {
        ResourcePool::from_specs(&[ResourceSpec::new("A", 2), ResourceSpec::new("B", 1)]).unwrap()
    }

    #[test]
    fn test_from_spec_resolves_demand() {
        let spec = TaskSpec::new("t1", 50, 100)
            .with_demand("B", 1)
            .with_demand("A", 2);
        let t = Task::from_spec(TaskId(0), &spec, &pool(), 3).unwrap();

        assert_eq!(t.name(), "t1");
        assert_eq!(t.status(), TaskStatus::Waiting);
        assert_eq!(t.demand()[0].resource.index(), 1);
        assert_eq!(t.demand()[1].amount, 2);
        assert_eq!(t.busy(), Duration::from_millis(50));
        assert_eq!(t.idle(), Duration::from_millis(100));
        assert_eq!(t.holding_of("A"), Some(0));
        assert_eq!(t.holding_of("C"), None);
        assert!(t.holds_nothing());
        assert!(!t.holds_full_demand());
        assert!(!t.is_finished());
    }

    #[test]
    fn test_unknown_resource_is_config_error() {
        let spec = TaskSpec::new("t1", 1, 1).with_demand("Z", 1);
        let err = Task::from_spec(TaskId(0), &spec, &pool(), 1).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownResource { ref task, ref resource } if task == "t1" && resource == "Z"
        ));
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        let zero = TaskSpec::new("t1", 1, 1).with_demand("A", 0);
        assert_eq!(
            Task::from_spec(TaskId(0), &zero, &pool(), 1).unwrap_err().as_label(),
            "config_zero_demand"
        );

        let negative = TaskSpec::new("t1", 1, 1).with_demand("A", -1);
        assert_eq!(
            Task::from_spec(TaskId(0), &negative, &pool(), 1).unwrap_err().as_label(),
            "config_negative"
        );

        let dup = TaskSpec::new("t1", 1, 1).with_demand("A", 1).with_demand("A", 1);
        assert_eq!(
            Task::from_spec(TaskId(0), &dup, &pool(), 1).unwrap_err().as_label(),
            "config_duplicate_demand"
        );
    }

    #[test]
    fn test_negative_times_rejected() {
        let spec = TaskSpec::new("t1", -5, 1);
        let err = Task::from_spec(TaskId(0), &spec, &pool(), 1).unwrap_err();
        assert!(matches!(err, ConfigError::Negative { value: -5, .. }));
    }

    #[test]
    fn test_iteration_counting() {
        let spec = TaskSpec::new("t1", 0, 0);
        let mut t = Task::from_spec(TaskId(0), &spec, &pool(), 2).unwrap();
        assert_eq!(t.complete_iteration(), 1);
        assert!(!t.is_finished());
        assert_eq!(t.complete_iteration(), 2);
        assert!(t.is_finished());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TaskStatus::Waiting.to_string(), "WAIT");
        assert_eq!(TaskStatus::Running.to_string(), "RUN");
        assert_eq!(TaskStatus::Idle.to_string(), "IDLE");
    }
}
