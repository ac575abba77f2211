//! Runtime core: shared state, allocation and orchestration.
//!
//! The public API from this module is [`Simulation`] (with its builder) and
//! [`Session`]/[`State`], the lock-protected aggregate drivers operate on.
//!
//! Internal modules:
//! - [`allocator`]: all-or-nothing acquisition and full release;
//! - [`driver`]: runs one task through its WAIT → RUN → IDLE iterations;
//! - [`monitor`]: publishes periodic status snapshots;
//! - [`simulation`]: spawns drivers and the monitor, builds the final report.

mod allocator;
mod builder;
mod driver;
mod monitor;
mod simulation;
mod state;

pub use builder::SimulationBuilder;
pub use simulation::Simulation;
pub use state::{Session, State, Unsatisfiable};
