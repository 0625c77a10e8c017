//! Checkpoint and Resume
//!
//! This example demonstrates resuming streak detection after the process
//! stops part-way through a stream.
//!
//! Key concepts:
//! - Machine configuration loaded from JSON
//! - Periodic checkpoints to a file store with atomic writes
//! - Resume from interruption without double-reporting a streak
//! - Refusing a snapshot that does not fit the current table
//!
//! Run with: cargo run --example checkpoint_resume

use std::str::FromStr;
use streakfsm::checkpoint::{CheckpointError, SnapshotFormat};
use streakfsm::config::{CheckpointConfig, MachineConfig};
use streakfsm::core::{AnomalyEvent, TriggerPolicy};
use streakfsm::driver::Driver;
use tracing_subscriber::{filter::Directive, EnvFilter, FmtSubscriber};

const CONFIG: &str = r#"{
    "machine_id": "line-1",
    "alphabet": ["S", "L"],
    "states": ["Q0", "S", "L"],
    "initial_state": "Q0",
    "edges": [
        { "from": "Q0", "symbol": "S", "to": "S" },
        { "from": "Q0", "symbol": "L", "to": "L" },
        { "from": "S", "symbol": "S", "to": "S" },
        { "from": "S", "symbol": "L", "to": "L" },
        { "from": "L", "symbol": "S", "to": "S" },
        { "from": "L", "symbol": "L", "to": "L" }
    ],
    "trigger": { "run_length": { "threshold": 3 } }
}"#;

fn report(event: AnomalyEvent<char>) {
    println!(
        "  anomaly at reading {}: {} x{}",
        event.position, event.symbol, event.run_length
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Directive::from_str("info")?)
                .from_env_lossy(),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("=== Checkpoint and Resume ===\n");

    let dir = std::env::temp_dir().join("streakfsm-checkpoint-demo");
    let mut config: MachineConfig<String, char> = MachineConfig::from_json_str(CONFIG)?;
    config.checkpoint = Some(CheckpointConfig {
        dir: dir.clone(),
        format: SnapshotFormat::Json,
        every: 2,
    });

    let readings: Vec<char> = "SLLLLSSSSSSLLL".chars().collect();
    let (before, after) = readings.split_at(3);

    // First run: stops after three readings, in the middle of an L streak.
    println!("Run 1: {:?}", before.iter().collect::<String>());
    let mut driver = Driver::from_config(&config)?;
    driver.drive(before.iter().copied(), &mut report)?;
    println!(
        "  stopped at position {}, run length {}\n",
        driver.runtime().run_state().position,
        driver.runtime().run_state().run_length
    );
    drop(driver);

    // Second run: a fresh process picks up where the first left off.
    println!("Run 2: {:?}", after.iter().collect::<String>());
    let mut driver = Driver::from_config(&config)?;
    if driver.resume()? {
        println!("  resumed at position {}", driver.runtime().run_state().position);
    }
    let summary = driver.drive(after.iter().copied(), &mut report)?;
    println!(
        "  {} steps, {} anomalies, {} checkpoints\n",
        summary.steps, summary.events, summary.checkpoints
    );

    // A machine with detection disabled cannot adopt a latched snapshot.
    println!("Run 3: same store, detection disabled");
    config.trigger = TriggerPolicy::Disabled;
    let mut driver = Driver::from_config(&config)?;
    match driver.resume() {
        Err(CheckpointError::InvalidSnapshot { reason }) => println!("  refused: {reason}"),
        Err(e) => return Err(e.into()),
        Ok(resumed) => println!("  resumed: {resumed}"),
    }

    std::fs::remove_dir_all(&dir)?;
    println!("\n=== Example Complete ===");

    Ok(())
}
