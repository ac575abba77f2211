//! # ressim
//!
//! **ressim** simulates concurrent tasks competing for a shared pool of
//! multi-unit resources.
//!
//! Each task repeatedly acquires its whole demand atomically (all or nothing),
//! holds it for a busy period, releases it and idles, for a configured number
//! of iterations. A monitor publishes periodic status snapshots and a final
//! report summarizes per-resource and per-task statistics.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ConfigLoader ──► SystemSpec ──► SimulationBuilder::build()
//!                                          │
//!                                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Simulation (orchestrator)                                        │
//! │  - Session (ResourcePool + Tasks behind one Mutex, release Notify)│
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐  ┌─────────┐
//!     │  TaskDriver  │   │  TaskDriver  │   │  TaskDriver  │  │ Monitor │
//!     │ WAIT→RUN→IDLE│   │ WAIT→RUN→IDLE│   │ WAIT→RUN→IDLE│  │snapshots│
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘  └┬────────┘
//!      │ TaskWaiting      │ TaskAcquired     │ Iteration-      │ Monitor-
//!      │ TaskAcquired     │ TaskReleased     │ Completed       │ Snapshot
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                  Bus (broadcast channel)                          │
//! │              (capacity: Config::bus_capacity)                     │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          ┌────────┼────────┐
//!                          ▼        ▼        ▼
//!                      LogWriter  sub2 ...  subN
//! ```
//!
//! ### Task life cycle
//! ```text
//! loop {
//!   ├─► lock ─► try_acquire(full demand)
//!   │       ├─ ok   ─► RUNNING, record wait ─► unlock ─► sleep(busy)
//!   │       └─ fail ─► WAITING (start wait timer once) ─► unlock ─► retry delay
//!   ├─► lock ─► release all ─► IDLE ─► unlock ─► sleep(idle)
//!   └─► lock ─► iteration += 1
//!           ├─ target reached ─► stay IDLE, exit
//!           └─ otherwise      ─► WAITING
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                         |
//! |-------------------|----------------------------------------------------------|--------------------------------------------|
//! | **Descriptors**   | Resources and tasks, built in code or loaded from a file. | [`SystemSpec`], [`TaskSpec`], [`ConfigLoader`] |
//! | **Allocation**    | Atomic all-or-nothing acquisition over a shared pool.     | [`Session`], [`State`], [`ResourcePool`]   |
//! | **Simulation**    | Drivers per task plus a monitor, final report.            | [`Simulation`], [`Report`]                 |
//! | **Policies**      | Retry delay, growth, jitter, wake-on-release.             | [`RetryPolicy`], [`BackoffPolicy`]         |
//! | **Subscriber API**| Hook into simulation events.                              | [`Subscribe`], [`Event`]                   |
//! | **Errors**        | Typed configuration, runtime and invariant errors.        | [`ConfigError`], [`RuntimeError`]          |
//! | **Configuration** | Centralized runtime settings.                             | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in console [`LogWriter`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use ressim::{Config, ConfigLoader, Simulation};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let parsed = ConfigLoader::parse(
//!         "resources A:1 B:1\n\
//!          task t1 5 5 A:1 B:1\n\
//!          task t2 5 5 B:1\n",
//!     )?;
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn ressim::Subscribe>> = vec![Arc::new(ressim::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn ressim::Subscribe>> = Vec::new();
//!
//!     let cfg = Config { iterations: 2, ..Config::default() };
//!     let report = Simulation::builder(cfg)
//!         .with_subscribers(subs)
//!         .build(&parsed.spec)?
//!         .run()
//!         .await?;
//!
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod loader;
mod policies;
mod pool;
mod report;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Session, Simulation, SimulationBuilder, State, Unsatisfiable};
pub use error::{ConfigError, InvariantViolation, PoolError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use loader::{ConfigLoader, Parsed, SkippedLine};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use pool::{Resource, ResourceId, ResourcePool, ResourceSpec};
pub use report::{DemandReport, Report, ResourceReport, StatusSnapshot, TaskReport};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Demand, SystemSpec, Task, TaskId, TaskSpec, TaskStatus};

// Optional: expose a simple built-in logger subscriber.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
