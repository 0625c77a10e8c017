//! Trigger policies deciding when a step emits an anomaly event.
//!
//! A policy is plain data plus a pure predicate over the run state, so it
//! can live in configuration files and be evaluated without side effects.

use super::run::RunState;
use super::state::{State, Symbol};
use serde::{Deserialize, Serialize};

/// Anomaly detection configured for a runtime.
///
/// # Example
///
/// ```rust
/// use streakfsm::core::{RunState, TriggerPolicy};
///
/// let policy = TriggerPolicy::run_length(2);
/// let run: RunState<String, char> = RunState::new("Q0".to_string());
/// let run = run.advance(&'S', "S1".to_string());
/// assert!(!policy.fires(&run));
///
/// let run = run.advance(&'S', "S2".to_string());
/// assert!(policy.fires(&run));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Never emit events
    #[default]
    Disabled,

    /// Emit once per maximal run of identical symbols reaching `threshold`
    RunLength { threshold: usize },
}

impl TriggerPolicy {
    /// N-in-a-row policy.
    pub fn run_length(threshold: usize) -> Self {
        Self::RunLength { threshold }
    }

    /// Configured run-length threshold, if any.
    pub fn threshold(&self) -> Option<usize> {
        match self {
            Self::Disabled => None,
            Self::RunLength { threshold } => Some(*threshold),
        }
    }

    /// Check if the policy fires for a run state that has just advanced.
    ///
    /// Fires only while the latch is clear, so a run that keeps going past
    /// the threshold is reported once.
    pub fn fires<S: State, Y: Symbol>(&self, run: &RunState<S, Y>) -> bool {
        match self {
            Self::Disabled => false,
            Self::RunLength { threshold } => !run.latched && run.run_length >= *threshold,
        }
    }
}
