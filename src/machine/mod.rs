//! Transition tables and the runtime that executes them.
//!
//! A [`TransitionTable`] is immutable once built and can be shared by any
//! number of [`Runtime`]s. Each runtime owns its own run state, so runtimes
//! never interfere with one another.

mod error;
mod runtime;
mod table;

pub use error::{RuntimeError, StepError};
pub use runtime::Runtime;
pub use table::{MissingTransitions, TransitionTable};
