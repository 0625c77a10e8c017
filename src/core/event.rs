//! Structured values produced by a step.

use super::state::{State, Symbol};
use serde::{Deserialize, Serialize};

/// Notification emitted when a run of identical symbols reaches the
/// configured threshold.
///
/// Carries data only. Presenting it (console line, log record, alert) is the
/// event sink's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct AnomalyEvent<Y: Symbol> {
    /// Symbol repeated in the triggering run
    pub symbol: Y,
    /// Run length at the moment of triggering
    pub run_length: usize,
    /// 0-based index of the triggering symbol in the input stream
    pub position: u64,
}

/// Result of feeding one symbol to a runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepOutcome<S: State, Y: Symbol> {
    /// State before the step
    pub from: S,
    /// Symbol consumed
    pub symbol: Y,
    /// State after the step
    pub state: S,
    /// 0-based index of the consumed symbol
    pub position: u64,
    /// Anomaly emitted by this step, if any
    pub event: Option<AnomalyEvent<Y>>,
}

impl<S: State, Y: Symbol> StepOutcome<S, Y> {
    /// Split into `(new_state, event)`.
    pub fn into_parts(self) -> (S, Option<AnomalyEvent<Y>>) {
        (self.state, self.event)
    }

    pub fn is_anomaly(&self) -> bool {
        self.event.is_some()
    }
}
