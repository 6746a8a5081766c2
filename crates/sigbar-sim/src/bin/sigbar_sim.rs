//! sigbar simulator
//!
//! - `replay` feeds scripted TOML scenarios through a controller and prints
//!   every published icon selection as a JSON line
//! - `walk` drives a subscription runtime with seeded random telemetry and
//!   prints a summary

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sigbar_core::{SignalConfig, SubscriptionInfo, SubscriptionRuntime};
use sigbar_sim::random_walk::{TelemetryWalk, WalkConfig};
use sigbar_sim::scenario::Scenario;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sigbar-sim",
    about = "Drive the cellular signal engine from scripts or random telemetry"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay scenario files.
    Replay {
        /// Scenario TOML files.
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,

        /// Check `[[expect]]` entries and fail on mismatch.
        #[arg(long, default_value_t = false)]
        verify: bool,

        /// Print every step, not only published ones.
        #[arg(long, default_value_t = false)]
        all_steps: bool,
    },
    /// Soak a subscription runtime with random telemetry.
    Walk {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 1000)]
        steps: usize,

        /// Engine configuration TOML.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Replay {
            scenarios,
            verify,
            all_steps,
        } => replay(&scenarios, verify, all_steps),
        Command::Walk {
            seed,
            steps,
            config,
        } => walk(seed, steps, config),
    }
}

fn replay(paths: &[PathBuf], verify: bool, all_steps: bool) -> Result<()> {
    for path in paths {
        let scenario = Scenario::load(path)?;
        let replay = scenario.run()?;
        for outcome in replay.outcomes.iter().filter(|o| all_steps || o.published) {
            println!("{}", serde_json::to_string(outcome)?);
        }
        if verify {
            scenario.verify(&replay)?;
            tracing::info!(
                scenario = %replay.name,
                checks = scenario.expect.len(),
                "expectations met"
            );
        }
    }
    Ok(())
}

fn walk(seed: u64, steps: usize, config: Option<PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            SignalConfig::from_toml_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => SignalConfig::default(),
    };

    let runtime = SubscriptionRuntime::spawn(config, SubscriptionInfo::default())
        .context("failed to start subscription runtime")?;
    let updates = runtime.subscribe()?;

    let sender = runtime.sender();
    let producer = thread::spawn(move || {
        let mut walk = TelemetryWalk::new(WalkConfig {
            seed,
            steps,
            ..WalkConfig::default()
        });
        walk.events()
            .into_iter()
            .try_for_each(|event| sender.send(event))
    });
    producer
        .join()
        .map_err(|_| anyhow::anyhow!("telemetry producer panicked"))??;
    runtime.barrier()?;

    let mut received = 0usize;
    let mut last = None;
    while let Ok(selection) = updates.recv_timeout(Duration::from_millis(100)) {
        received += 1;
        last = Some(selection);
    }

    tracing::info!(seed, steps, received, "walk finished");
    if let Some(selection) = last {
        println!("{}", serde_json::to_string_pretty(&selection)?);
    }
    Ok(())
}
