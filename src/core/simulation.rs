//! # Simulation: session orchestrator.
//!
//! A [`Simulation`] owns one validated [`Session`], starts a driver per task
//! plus the monitor, waits for every driver to finish and produces the final
//! [`Report`].
//!
//! ## Architecture
//! ```text
//! SimulationBuilder::build(&SystemSpec)
//!        ▼
//!   Simulation::run()
//!     ├─ subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!     ├─ publish SimulationStarted (+ UnsatisfiableDemand warnings)
//!     ├─ Monitor::start()                      (first snapshot before any driver)
//!     ├─ lock ─► spawn every TaskDriver ─► unlock   (drivers start together)
//!     ├─ join all drivers                      (a panicking driver aborts the rest)
//!     ├─ MonitorHandle::stop()                 (cancelled under the lock)
//!     ├─ Session::report(elapsed)
//!     └─ publish SimulationFinished ─► drain subscribers ─► Ok(Report)
//! ```
//!
//! ## Example
//! ```rust
//! use ressim::{Config, Simulation, SystemSpec, TaskSpec};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let spec = SystemSpec::new()
//!         .with_resource("A", 1)
//!         .with_task(TaskSpec::new("t1", 5, 5).with_demand("A", 1))
//!         .with_task(TaskSpec::new("t2", 5, 5).with_demand("A", 1));
//!
//!     let cfg = Config { iterations: 2, ..Config::default() };
//!     let report = Simulation::builder(cfg).build(&spec)?.run().await?;
//!
//!     assert_eq!(report.task("t1").map(|t| t.iterations_completed), Some(2));
//!     Ok(())
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::{JoinHandle, JoinSet},
    time::Instant,
};

use crate::{
    config::Config,
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    report::Report,
    subscribers::{Subscribe, SubscriberSet},
};

use super::{
    builder::SimulationBuilder,
    driver::TaskDriver,
    monitor::{Monitor, MonitorHandle},
    state::Session,
};

type DriverResult = Result<(), (Arc<str>, String)>;

/// Runs one session of concurrent task drivers over a shared resource pool.
pub struct Simulation {
    cfg: Config,
    bus: Bus,
    session: Arc<Session>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Simulation {
    /// Starts building a simulation with the given configuration.
    pub fn builder(cfg: Config) -> SimulationBuilder {
        SimulationBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        session: Arc<Session>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self {
            cfg,
            bus,
            session,
            subscribers,
        }
    }

    /// The shared session; lets callers inspect state while the run is in flight.
    pub fn session(&self) -> Arc<Session> {
        Arc::clone(&self.session)
    }

    /// The configuration this simulation runs with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// A raw receiver on the event bus, in addition to the subscribers.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs every task to its iteration target and returns the final report.
    ///
    /// ### Errors
    /// [`RuntimeError::WorkerFailed`] if a driver, the monitor or the event
    /// listener terminates abnormally. Remaining drivers are aborted.
    pub async fn run(self) -> Result<Report, RuntimeError> {
        let listener = self.subscriber_listener();
        let started = Instant::now();
        self.announce().await;

        let monitor = match self.cfg.monitor_interval_opt() {
            Some(interval) => Some(
                Monitor::new(Arc::clone(&self.session), self.bus.clone(), interval)
                    .start()
                    .await,
            ),
            None => None,
        };

        let mut set = JoinSet::new();
        self.spawn_drivers(&mut set, started).await;
        let joined = Self::join_drivers(&mut set).await;
        let stopped = Self::stop_monitor(monitor).await;

        let elapsed = started.elapsed();
        let outcome = joined.and(stopped);
        let report = self.session.report(elapsed).await;

        let mut done = Event::new(EventKind::SimulationFinished).with_elapsed(elapsed);
        if let Err(e) = &outcome {
            done = done.with_reason(e.as_label());
        }
        self.bus.publish(done);

        listener.await.map_err(|e| RuntimeError::WorkerFailed {
            worker: "event-listener".to_string(),
            reason: e.to_string(),
        })?;
        outcome.map(|()| report)
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// Exits after forwarding `SimulationFinished`, then drains every
    /// subscriber queue.
    fn subscriber_listener(&self) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::new(self.subscribers.clone());
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        let last = ev.kind == EventKind::SimulationFinished;
                        set.emit(&ev);
                        if last {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        eprintln!("[ressim] event listener lagged: {n} events skipped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        })
    }

    /// Publishes the start event and one warning per unsatisfiable demand.
    async fn announce(&self) {
        let st = self.session.lock().await;
        self.bus.publish(Event::new(EventKind::SimulationStarted).with_reason(format!(
            "resources={} tasks={} iterations={}",
            st.pool().len(),
            st.tasks().len(),
            self.cfg.iterations
        )));
        for u in st.unsatisfiable() {
            self.bus.publish(
                Event::new(EventKind::UnsatisfiableDemand)
                    .with_task(u.task)
                    .with_resource(u.resource)
                    .with_reason(format!("needs {}, capacity {}", u.needed, u.capacity)),
            );
        }
    }

    /// Spawns every driver while holding the aggregate lock.
    async fn spawn_drivers(&self, set: &mut JoinSet<DriverResult>, started: Instant) {
        let st = self.session.lock().await;
        for task in st.tasks() {
            let driver = TaskDriver::new(
                task,
                Arc::clone(&self.session),
                self.cfg.retry,
                self.bus.clone(),
                started,
            );
            let name = Arc::clone(driver.name());
            set.spawn(async move {
                std::panic::AssertUnwindSafe(driver.run())
                    .catch_unwind()
                    .await
                    .map_err(|p| (name, panic_message(p.as_ref())))
            });
        }
    }

    /// Waits for every driver. On the first failure the rest are aborted.
    async fn join_drivers(set: &mut JoinSet<DriverResult>) -> Result<(), RuntimeError> {
        while let Some(res) = set.join_next().await {
            let err = match res {
                Ok(Ok(())) => continue,
                Ok(Err((worker, reason))) => RuntimeError::WorkerFailed {
                    worker: worker.to_string(),
                    reason,
                },
                Err(e) => RuntimeError::WorkerFailed {
                    worker: "driver".to_string(),
                    reason: e.to_string(),
                },
            };
            set.shutdown().await;
            return Err(err);
        }
        Ok(())
    }

    async fn stop_monitor(monitor: Option<MonitorHandle>) -> Result<(), RuntimeError> {
        match monitor {
            Some(m) => m.stop().await.map(|_| ()),
            None => Ok(()),
        }
    }
}

fn panic_message(p: &(dyn Any + Send)) -> String {
    if let Some(s) = p.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = p.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
