//! Core machine types and logic.
//!
//! This module contains the pure pieces of the engine:
//! - State and symbol identifiers via the `State` and `Symbol` traits
//! - The persistable `RunState`
//! - Trigger policies evaluated after each step
//! - Event and step outcome values
//!
//! Nothing here performs I/O.

mod event;
mod policy;
mod run;
mod state;

pub use event::{AnomalyEvent, StepOutcome};
pub use policy::TriggerPolicy;
pub use run::RunState;
pub use state::{State, Symbol};

pub(crate) use state::label;
