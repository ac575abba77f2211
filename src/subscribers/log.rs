//! # LogWriter: console event printer
//!
//! A subscriber that prints incoming [`Event`]s to stdout. The CLI uses it
//! for all live output.
//!
//! ## Example output
//! ```text
//! monitor: [WAIT] t2
//!          [RUN]  t1
//!          [IDLE]
//!
//! task complete: t1 (iter= 1, time= 151 ms)
//! [unsatisfiable] task="big" resource="R" needs 10, capacity 5
//! ```
//!
//! With `verbose`, every state transition is printed too:
//! ```text
//! [waiting] task="t2"
//! [acquired] task="t2" waited=48ms
//! [released] task="t2"
//! [finished] task="t2" iterations=3
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter {
    verbose: bool,
}

impl LogWriter {
    /// Prints monitor snapshots, completed iterations and warnings.
    #[must_use]
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Also prints every task state transition and session event.
    #[must_use]
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::MonitorSnapshot => {
                if let Some(snap) = &e.snapshot {
                    println!("\n{snap}\n");
                }
            }
            EventKind::IterationCompleted => {
                println!(
                    "task complete: {task} (iter= {}, time= {} ms)",
                    e.iteration.unwrap_or(0),
                    e.elapsed.unwrap_or_default().as_millis()
                );
            }
            EventKind::UnsatisfiableDemand => {
                println!(
                    "[unsatisfiable] task={task:?} resource={:?} {}",
                    e.resource.as_deref().unwrap_or("?"),
                    e.reason.as_deref().unwrap_or("")
                );
            }
            _ if !self.verbose => {}
            EventKind::SimulationStarted => {
                println!("[started] {}", e.reason.as_deref().unwrap_or(""));
            }
            EventKind::TaskWaiting => {
                println!("[waiting] task={task:?}");
            }
            EventKind::TaskAcquired => {
                println!(
                    "[acquired] task={task:?} waited={:?}",
                    e.waited.unwrap_or_default()
                );
            }
            EventKind::TaskReleased => {
                println!("[released] task={task:?}");
            }
            EventKind::TaskFinished => {
                println!(
                    "[finished] task={task:?} iterations={}",
                    e.iteration.unwrap_or(0)
                );
            }
            EventKind::MonitorStopped => {
                println!("[monitor-stopped]");
            }
            EventKind::SimulationFinished => {
                println!(
                    "[all-finished] elapsed={:?}",
                    e.elapsed.unwrap_or_default()
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
