use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use ressim::{
    Config, ConfigLoader, Event, EventKind, RetryPolicy, Session, Simulation, Subscribe,
    SystemSpec, TaskSpec, TaskStatus,
};

#[derive(Default)]
struct Collect(Mutex<Vec<Event>>);

impl Collect {
    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events().into_iter().filter(|e| e.kind == kind).collect()
    }
}

#[async_trait]
impl Subscribe for Collect {
    async fn on_event(&self, ev: &Event) {
        self.0.lock().unwrap().push(ev.clone());
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}

fn cfg(iterations: u32) -> Config {
    Config {
        iterations,
        monitor_interval: Duration::from_millis(20),
        ..Config::default()
    }
}

/// Checks the aggregate invariants every millisecond until `stop` is set.
fn spawn_checker(
    session: Arc<Session>,
    stop: Arc<tokio::sync::Notify>,
    max_running: usize,
) -> tokio::task::JoinHandle<usize> {
    tokio::spawn(async move {
        let mut checks = 0;
        loop {
            {
                let st = session.lock().await;
                st.check_invariants().unwrap();
                let running = st
                    .tasks()
                    .iter()
                    .filter(|t| t.status() == TaskStatus::Running)
                    .count();
                assert!(running <= max_running, "{running} tasks running at once");
                for t in st.tasks() {
                    assert!(t.holds_nothing() || t.holds_full_demand());
                }
            }
            checks += 1;
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(1)) => {}
                _ = stop.notified() => return checks,
            }
        }
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_tasks_sharing_a_resource_complete() {
    let spec = SystemSpec::new()
        .with_resource("A", 1)
        .with_resource("B", 1)
        .with_task(TaskSpec::new("t1", 10, 10).with_demand("A", 1).with_demand("B", 1))
        .with_task(TaskSpec::new("t2", 10, 10).with_demand("B", 1));

    let sink = Arc::new(Collect::default());
    let sim = Simulation::builder(cfg(3))
        .with_subscriber(sink.clone())
        .build(&spec)
        .unwrap();

    let stop = Arc::new(tokio::sync::Notify::new());
    let checker = spawn_checker(sim.session(), stop.clone(), 1);

    let report = timeout(Duration::from_secs(10), sim.run())
        .await
        .expect("simulation hung")
        .unwrap();
    stop.notify_one();
    assert!(checker.await.unwrap() > 0);

    for name in ["t1", "t2"] {
        let t = report.task(name).unwrap();
        assert_eq!(t.iterations_completed, 3);
        assert_eq!(t.status, TaskStatus::Idle);
        assert!(t.demand.iter().all(|d| d.held == 0));
    }
    for r in &report.resources {
        assert_eq!(r.held, 0);
    }

    assert_eq!(sink.of_kind(EventKind::IterationCompleted).len(), 6);
    assert_eq!(sink.of_kind(EventKind::TaskFinished).len(), 2);
    assert!(!sink.of_kind(EventKind::MonitorSnapshot).is_empty());
    assert_eq!(
        sink.events().last().map(|e| e.kind),
        Some(EventKind::SimulationFinished)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_capacity_demands_take_turns() {
    let spec = SystemSpec::new()
        .with_resource("R", 2)
        .with_task(TaskSpec::new("a", 10, 5).with_demand("R", 2))
        .with_task(TaskSpec::new("b", 10, 5).with_demand("R", 2));

    let sim = Simulation::builder(cfg(1)).build(&spec).unwrap();
    let session = sim.session();
    let stop = Arc::new(tokio::sync::Notify::new());
    let checker = spawn_checker(sim.session(), stop.clone(), 1);

    let report = timeout(Duration::from_secs(10), sim.run())
        .await
        .expect("simulation hung")
        .unwrap();
    stop.notify_one();
    checker.await.unwrap();

    assert!(report.tasks.iter().all(|t| t.iterations_completed == 1));
    assert_eq!(report.resource("R").unwrap().held, 0);
    session.check_invariants().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_exclusive_pair_never_runs_together() {
    let spec = SystemSpec::new()
        .with_resource("A", 1)
        .with_resource("B", 1)
        .with_task(TaskSpec::new("p", 15, 0).with_demand("A", 1).with_demand("B", 1))
        .with_task(TaskSpec::new("q", 15, 0).with_demand("A", 1).with_demand("B", 1));

    let sim = Simulation::builder(cfg(2)).build(&spec).unwrap();
    let stop = Arc::new(tokio::sync::Notify::new());
    let checker = spawn_checker(sim.session(), stop.clone(), 1);

    let report = timeout(Duration::from_secs(10), sim.run())
        .await
        .expect("simulation hung")
        .unwrap();
    stop.notify_one();
    checker.await.unwrap();

    // Four busy periods of 15ms that can never overlap.
    assert!(report.elapsed >= Duration::from_millis(60));
    let waited: Duration = report.tasks.iter().map(|t| t.waited).sum();
    assert!(waited > Duration::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unsatisfiable_demand_waits_forever() {
    let spec = SystemSpec::new()
        .with_resource("R", 5)
        .with_task(TaskSpec::new("big", 10, 10).with_demand("R", 10));

    let sim = Simulation::builder(cfg(1)).build(&spec).unwrap();
    let session = sim.session();
    let mut rx = sim.subscribe();

    let res = timeout(Duration::from_millis(200), sim.run()).await;
    assert!(res.is_err(), "simulation should not terminate");

    let snap = session.snapshot().await;
    assert_eq!(snap.waiting.len(), 1);
    assert_eq!(&*snap.waiting[0], "big");
    assert_eq!(session.lock().await.pool().available("R"), Ok(5));

    let mut warned = false;
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::UnsatisfiableDemand {
            assert_eq!(ev.task.as_deref(), Some("big"));
            assert_eq!(ev.resource.as_deref(), Some("R"));
            warned = true;
        }
        assert_ne!(ev.kind, EventKind::TaskAcquired);
    }
    assert!(warned);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_abandoned_run_stops_monitor() {
    let spec = SystemSpec::new()
        .with_resource("R", 5)
        .with_task(TaskSpec::new("big", 10, 10).with_demand("R", 10));
    let cfg = Config {
        monitor_interval: Duration::from_millis(10),
        ..cfg(1)
    };

    let sim = Simulation::builder(cfg).build(&spec).unwrap();
    let session = sim.session();
    let mut rx = sim.subscribe();

    assert!(timeout(Duration::from_millis(50), sim.run()).await.is_err());
    // A snapshot already under way when the run was dropped may still land.
    tokio::time::sleep(Duration::from_millis(20)).await;
    while rx.try_recv().is_ok() {}

    tokio::time::sleep(Duration::from_millis(200)).await;
    let mut late = 0;
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::MonitorSnapshot {
            late += 1;
        }
    }
    assert_eq!(late, 0, "snapshots published after the run was dropped");
    assert_eq!(Arc::strong_count(&session), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zero_tasks_terminates_immediately() {
    let spec = SystemSpec::new().with_resource("A", 3);
    let sink = Arc::new(Collect::default());

    let report = Simulation::builder(cfg(5))
        .with_subscriber(sink.clone())
        .build(&spec)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(report.tasks.is_empty());
    assert_eq!(report.resources.len(), 1);
    assert_eq!(report.resources[0].capacity, 3);
    assert_eq!(report.resources[0].held, 0);

    let snaps = sink.of_kind(EventKind::MonitorSnapshot);
    assert!(!snaps.is_empty());
    for ev in snaps {
        assert!(ev.snapshot.unwrap().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wake_on_release_does_not_wait_for_long_poll() {
    let spec = SystemSpec::new()
        .with_resource("A", 1)
        .with_task(TaskSpec::new("t1", 20, 0).with_demand("A", 1))
        .with_task(TaskSpec::new("t2", 20, 0).with_demand("A", 1));

    let cfg = Config {
        iterations: 2,
        monitor_interval: Duration::ZERO,
        retry: RetryPolicy::polling(Duration::from_secs(30)).with_wake_on_release(true),
        ..Config::default()
    };
    let report = timeout(
        Duration::from_secs(5),
        Simulation::builder(cfg).build(&spec).unwrap().run(),
    )
    .await
    .expect("waiter missed a release wake-up")
    .unwrap();

    for t in &report.tasks {
        assert_eq!(t.iterations_completed, 2);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_loaded_file_runs_end_to_end() {
    let parsed = ConfigLoader::parse(
        "# three tasks, two resources\n\
         resources A:2 B:1\n\
         task t1 5 5 A:1 B:1\n\
         task t2 5 5 A:1\n\
         task t3 5 5 A:2\n\
         bogus line\n",
    )
    .unwrap();
    assert_eq!(parsed.skipped.len(), 1);

    let report = timeout(
        Duration::from_secs(10),
        Simulation::builder(cfg(2)).build(&parsed.spec).unwrap().run(),
    )
    .await
    .expect("simulation hung")
    .unwrap();

    assert_eq!(report.tasks.len(), 3);
    assert!(report.tasks.iter().all(|t| t.iterations_completed == 2));
    let text = report.to_string();
    assert!(text.starts_with("All Resources:"));
    assert!(text.contains("[2] t3 (IDLE, runTime= 5 ms, idleTime= 5 ms):"));
}

#[test]
fn test_invalid_descriptors_rejected_before_start() {
    let cases = [
        (
            SystemSpec::new()
                .with_resource("A", 1)
                .with_task(TaskSpec::new("t", 1, 1).with_demand("Z", 1)),
            "config_unknown_resource",
        ),
        (
            SystemSpec::new()
                .with_resource("A", 1)
                .with_task(TaskSpec::new("t", 1, 1).with_demand("A", 0)),
            "config_zero_demand",
        ),
        (SystemSpec::new().with_resource("A", -1), "config_negative"),
        (
            SystemSpec::new().with_resource("A", 1).with_resource("A", 2),
            "config_duplicate_resource",
        ),
        (
            SystemSpec::new()
                .with_resource("A", 1)
                .with_task(TaskSpec::new("t", -1, 1)),
            "config_negative",
        ),
    ];
    for (spec, label) in cases {
        match Simulation::builder(Config::default()).build(&spec) {
            Err(e) => assert_eq!(e.as_label(), label),
            Ok(_) => panic!("expected {label}"),
        }
    }

    let zero = Config {
        iterations: 0,
        ..Config::default()
    };
    match Simulation::builder(zero).build(&SystemSpec::new()) {
        Err(e) => assert_eq!(e.as_label(), "config_zero_iterations"),
        Ok(_) => panic!("expected config_zero_iterations"),
    }
}
