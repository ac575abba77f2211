//! `ressim <config> <monitor_ms> <iterations>`: run a simulation from a file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use ressim::{Config, ConfigLoader, LogWriter, RetryPolicy, RuntimeError, Simulation, Subscribe};

#[derive(Parser, Debug)]
#[command(name = "ressim", version, about = "Concurrent resource allocation simulator")]
struct Cli {
    /// System description file (`resources ...` / `task ...` lines)
    config: PathBuf,

    /// Delay between monitor snapshots in milliseconds (0 disables the monitor)
    monitor_ms: u64,

    /// Iterations every task runs
    iterations: u32,

    /// Delay between acquisition attempts of a waiting task, in milliseconds
    #[arg(long = "retry-ms", default_value_t = 10)]
    retry_ms: u64,

    /// Also retry as soon as any task releases resources
    #[arg(long = "wake-on-release")]
    wake_on_release: bool,

    /// Print every task state transition
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .map_err(|source| RuntimeError::RuntimeStart { source })?;
    rt.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    println!(
        "main: config={}, monitor_ms={}, iterations={}",
        cli.config.display(),
        cli.monitor_ms,
        cli.iterations
    );

    let parsed = ConfigLoader::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    for s in &parsed.skipped {
        eprintln!(
            "[ressim] skipping unexpected line {} in {}: {}",
            s.line,
            cli.config.display(),
            s.content
        );
    }

    let cfg = Config {
        monitor_interval: Duration::from_millis(cli.monitor_ms),
        iterations: cli.iterations,
        retry: RetryPolicy::polling(Duration::from_millis(cli.retry_ms))
            .with_wake_on_release(cli.wake_on_release),
        ..Config::default()
    };

    let writer = if cli.verbose {
        LogWriter::verbose()
    } else {
        LogWriter::new()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(writer)];

    let report = Simulation::builder(cfg)
        .with_subscribers(subs)
        .build(&parsed.spec)
        .context("invalid system description")?
        .run()
        .await?;

    println!("\n{report}");
    Ok(())
}
