//! Lollipop Streaks
//!
//! A factory line reports one lollipop per reading: `S` for strawberry,
//! `L` for lemon. Three of the same flavor in a row is an anomaly that
//! should be reported once, however long the streak lasts.
//!
//! Key concepts:
//! - Declaring a transition table with the `edges!` macro
//! - Moore outputs attached to states
//! - Run-length trigger policy with a latch
//!
//! Run with: cargo run --example toy_problem
//! Set RUST_LOG=trace to see every step.

use std::str::FromStr;
use streakfsm::builder::TableBuilder;
use streakfsm::core::TriggerPolicy;
use streakfsm::edges;
use streakfsm::machine::{Runtime, TransitionTable};
use streakfsm::TableError;
use tracing_subscriber::{filter::Directive, EnvFilter, FmtSubscriber};

const READINGS: &str = "SLSLSLSSLLSSLLSSSLLLSSSSLLLLSSSSSSSS";

fn lollipop_table() -> Result<TransitionTable<String, char>, TableError> {
    let states = ["Q0", "S1", "S2", "S3", "S4", "L1", "L2", "L3", "L4"];

    TableBuilder::new()
        .states(states.iter().map(|s| s.to_string()))
        .alphabet(['S', 'L'])
        .edges(edges! {
            "Q0" => { 'S' => "S1", 'L' => "L1" },
            "S1" => { 'S' => "S2", 'L' => "L1" },
            "S2" => { 'S' => "S3", 'L' => "L1" },
            "S3" => { 'S' => "S4", 'L' => "L1" },
            "S4" => { 'S' => "S4", 'L' => "L1" },
            "L1" => { 'S' => "S1", 'L' => "L2" },
            "L2" => { 'S' => "S1", 'L' => "L3" },
            "L3" => { 'S' => "S1", 'L' => "L4" },
            "L4" => { 'S' => "S1", 'L' => "L4" },
        })
        .initial("Q0".to_string())
        .strict_reachability(true)
        .output("S3".to_string(), "Error! Too many Strawberry lollipops!")
        .output("L3".to_string(), "Error! Too many Lemon lollipops!")
        .build()
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

    println!("=== Lollipop Streaks ===\n");

    let table = lollipop_table()?;
    println!(
        "Table: {} states, alphabet {:?}",
        table.states().len(),
        table.alphabet()
    );

    let mut runtime = Runtime::from_table(table, TriggerPolicy::run_length(3))?;
    println!("Initial state: {}\n", runtime.current_state());

    for symbol in READINGS.chars() {
        let outcome = runtime.step(symbol)?;

        if let Some(output) = runtime.current_output() {
            println!("[{:>2}] {symbol} -> {:<3} {output}", outcome.position, outcome.state);
        }
        if let Some(event) = &outcome.event {
            println!(
                "     anomaly: {} x{} starting at reading {}",
                event.symbol,
                event.run_length,
                event.position + 1 - event.run_length as u64
            );
        }
    }

    println!("\nFinal state: {}", runtime.current_state());
    println!("Readings processed: {}", runtime.run_state().position);

    Ok(())
}
