//! Configuration errors raised while building a transition table.

use std::fmt;
use thiserror::Error;

/// What is wrong with a rejected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFault {
    UnknownSource,
    UnknownSymbol,
    UnknownTarget,
}

impl fmt::Display for EdgeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSource => f.write_str("source is not a declared state"),
            Self::UnknownSymbol => f.write_str("symbol is not in the alphabet"),
            Self::UnknownTarget => f.write_str("target is not a declared state"),
        }
    }
}

/// Errors that can occur when building a transition table.
///
/// All of these are startup errors: a table that fails to build is never
/// usable, and nothing retries construction automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Alphabet is empty. Declare at least one symbol")]
    EmptyAlphabet,

    #[error("Symbol {symbol} is declared more than once")]
    DuplicateSymbol { symbol: String },

    #[error("State set is empty. Declare at least one state")]
    EmptyStates,

    #[error("State {state} is declared more than once")]
    DuplicateState { state: String },

    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Initial state {state} is not a declared state")]
    UnknownInitialState { state: String },

    #[error("Invalid edge {from} --{symbol}--> {to}: {fault}")]
    InvalidEdge {
        from: String,
        symbol: String,
        to: String,
        fault: EdgeFault,
    },

    #[error("Edge {from} --{symbol}--> is defined twice, targeting {existing} and {conflicting}")]
    DuplicateEdge {
        from: String,
        symbol: String,
        existing: String,
        conflicting: String,
    },

    #[error("State {state} has no inbound edge and is not the initial state")]
    UnreachableState { state: String },

    #[error("State {state} has no transition for symbols {missing:?}")]
    IncompleteTable { state: String, missing: Vec<String> },

    #[error("Output label attached to undeclared state {state}")]
    UnknownOutputState { state: String },

    #[error("Accepting state {state} is not a declared state")]
    UnknownAcceptingState { state: String },

    #[error("Accepting state {state} is listed more than once")]
    DuplicateAcceptingState { state: String },

    #[error("Streak length must be at least 1, got {length}")]
    InvalidStreakLength { length: usize },
}
