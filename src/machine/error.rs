//! Runtime errors.

use thiserror::Error;

/// Errors reported by a single step or lookup.
///
/// A failed step leaves the run state exactly as it was, so the caller can
/// retry with a corrected symbol or stop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("Symbol {symbol} is not part of the alphabet")]
    UnknownSymbol { symbol: String },

    #[error("State {state} is not part of the transition table")]
    UnknownState { state: String },

    #[error("No transition defined from {state} on {symbol}")]
    NoTransition { state: String, symbol: String },
}

/// Errors that can occur when constructing a runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("Initial state {state} is not part of the transition table")]
    UnknownInitialState { state: String },

    #[error("Run-length threshold must be at least 1, got {threshold}")]
    InvalidThreshold { threshold: usize },
}
