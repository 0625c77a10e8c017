//! Streakfsm: table-driven finite state machines with run-length anomaly
//! detection and checkpointing.
//!
//! The engine follows a "pure core, imperative shell" split. Transition
//! tables are validated once and are read-only afterwards; a runtime steps
//! through a table and evaluates its trigger policy without side effects
//! other than logging. Persistence and event delivery live in the shell.
//!
//! # Core Concepts
//!
//! - **TransitionTable**: validated `(state, symbol) -> state` mapping with an
//!   explicit policy for undefined pairs
//! - **Runtime**: current state, run length and latch for one input stream
//! - **TriggerPolicy**: emits one [`AnomalyEvent`] per run of identical
//!   symbols that reaches the threshold
//! - **Snapshot**: versioned run state that can be saved and restored
//!
//! # Example
//!
//! ```rust
//! use streakfsm::builder::StreakDetector;
//! use streakfsm::machine::Runtime;
//!
//! let detector = StreakDetector::new(vec!['S', 'L'])
//!     .on_streak("Error! Too many {symbol} lollipops!");
//! let table = detector.table().unwrap();
//! let mut runtime = Runtime::from_table(table, detector.policy()).unwrap();
//!
//! let mut events = Vec::new();
//! for symbol in "SLLLLSSSSSLLL".chars() {
//!     let (_, event) = runtime.step(symbol).unwrap().into_parts();
//!     events.extend(event);
//! }
//!
//! let positions: Vec<u64> = events.iter().map(|e| e.position).collect();
//! assert_eq!(positions, vec![3, 7, 12]);
//! assert_eq!(runtime.current_output(), Some("Error! Too many L lollipops!"));
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod driver;
pub mod machine;

// Re-export commonly used types
pub use builder::{Edge, StreakDetector, TableBuilder, TableError};
pub use checkpoint::{CheckpointError, Checkpointer, Snapshot, SnapshotFormat};
pub use config::{ConfigError, MachineConfig};
pub use core::{AnomalyEvent, RunState, State, StepOutcome, Symbol, TriggerPolicy};
pub use driver::{CollectingSink, DriveError, DriveSummary, Driver, EventSink};
pub use machine::{MissingTransitions, Runtime, RuntimeError, StepError, TransitionTable};
