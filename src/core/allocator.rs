//! # All-or-nothing acquisition and full release.
//!
//! Both functions run under the aggregate lock; they take the pool and the
//! task as split borrows of [`State`](crate::State).
//!
//! ```text
//! try_acquire:  check every demand ──► any short? ──► false (nothing changes)
//!                                        │
//!                                        └─ all fit ──► commit every demand ──► true
//!
//! release:      for each held entry ──► reclaim ──► holding = 0
//! ```

use crate::pool::ResourcePool;
use crate::tasks::Task;

/// Grants the task its whole demand or nothing.
///
/// Returns `true` if the task now holds its full demand. An empty demand is
/// always granted. Calling this on a task that already holds its demand is a
/// no-op that returns `true`.
pub(crate) fn try_acquire(pool: &mut ResourcePool, task: &mut Task) -> bool {
    if !task.holds_nothing() {
        return task.holds_full_demand();
    }

    let fits = task
        .demand()
        .iter()
        .all(|d| pool.available_by_id(d.resource) >= d.amount);
    if !fits {
        return false;
    }

    let wanted: Vec<_> = task.demand().iter().map(|d| (d.resource, d.amount)).collect();
    for (slot, (id, amount)) in task.holding_mut().iter_mut().zip(wanted) {
        pool.commit_id(id, amount);
        *slot = amount;
    }
    true
}

/// Returns every held unit to the pool. A task holding nothing is a no-op.
pub(crate) fn release(pool: &mut ResourcePool, task: &mut Task) {
    let ids: Vec<_> = task.demand().iter().map(|d| d.resource).collect();
    for (slot, id) in task.holding_mut().iter_mut().zip(ids) {
        if *slot > 0 {
            pool.reclaim_id(id, *slot);
            *slot = 0;
        }
    }
}
