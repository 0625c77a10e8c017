//! The persistable run state of an executing machine.

use super::state::{State, Symbol};
use serde::{Deserialize, Serialize};

/// Mutable snapshot of an in-progress execution.
///
/// This is the only data that survives a restart. The transition table is
/// rebuilt from configuration, so a `RunState` holds nothing but the current
/// state and the counters the trigger policy needs.
///
/// # Example
///
/// ```rust
/// use streakfsm::core::RunState;
///
/// let run: RunState<String, char> = RunState::new("Q0".to_string());
/// let run = run.advance(&'S', "S1".to_string());
/// let run = run.advance(&'S', "S2".to_string());
///
/// assert_eq!(run.current_state, "S2");
/// assert_eq!(run.run_length, 2);
/// assert_eq!(run.position, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct RunState<S: State, Y: Symbol> {
    /// State the machine is currently in
    pub current_state: S,
    /// Length of the current run of identical symbols (0 before any input)
    pub run_length: usize,
    /// Set once the current run has emitted its anomaly event
    pub latched: bool,
    /// Most recently consumed symbol
    pub last_symbol: Option<Y>,
    /// Number of symbols consumed so far; also the index of the next symbol
    pub position: u64,
}

impl<S: State, Y: Symbol> RunState<S, Y> {
    /// Fresh run state positioned at `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            current_state: initial,
            run_length: 0,
            latched: false,
            last_symbol: None,
            position: 0,
        }
    }

    /// Run state after consuming `symbol` and moving to `next`.
    ///
    /// Pure: the receiver is left untouched. A symbol that differs from the
    /// previous one starts a new run and clears the latch.
    pub fn advance(&self, symbol: &Y, next: S) -> Self {
        let continues_run = self.last_symbol.as_ref() == Some(symbol);
        let (run_length, latched) = if continues_run {
            (self.run_length.saturating_add(1), self.latched)
        } else {
            (1, false)
        };

        Self {
            current_state: next,
            run_length,
            latched,
            last_symbol: Some(symbol.clone()),
            position: self.position.saturating_add(1),
        }
    }

    /// Check the counters agree with each other.
    ///
    /// Returns a description of the first inconsistency found.
    pub fn check_consistency(&self) -> Result<(), String> {
        match (&self.last_symbol, self.run_length) {
            (None, 0) => {}
            (None, n) => return Err(format!("run length {n} recorded without a last symbol")),
            (Some(_), 0) => return Err("last symbol recorded with a zero run length".to_string()),
            (Some(_), _) => {}
        }
        if self.latched && self.last_symbol.is_none() {
            return Err("latch set before any symbol was consumed".to_string());
        }
        if (self.run_length as u64) > self.position {
            return Err(format!(
                "run length {} exceeds symbols consumed ({})",
                self.run_length, self.position
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> RunState<String, char> {
        RunState::new("Q0".to_string())
    }

    #[test]
    fn new_run_is_empty() {
        let run = fresh();
        assert_eq!(run.current_state, "Q0");
        assert_eq!(run.run_length, 0);
        assert!(!run.latched);
        assert!(run.last_symbol.is_none());
        assert_eq!(run.position, 0);
    }

    #[test]
    fn repeated_symbol_extends_run() {
        let run = fresh()
            .advance(&'L', "L1".to_string())
            .advance(&'L', "L2".to_string())
            .advance(&'L', "L3".to_string());

        assert_eq!(run.run_length, 3);
        assert_eq!(run.last_symbol, Some('L'));
        assert_eq!(run.position, 3);
    }

    #[test]
    fn different_symbol_restarts_run_and_clears_latch() {
        let mut run = fresh()
            .advance(&'L', "L1".to_string())
            .advance(&'L', "L2".to_string());
        run.latched = true;

        let same = run.advance(&'L', "L3".to_string());
        assert!(same.latched);

        let broken = run.advance(&'S', "S1".to_string());
        assert_eq!(broken.run_length, 1);
        assert!(!broken.latched);
    }

    #[test]
    fn advance_is_pure() {
        let run = fresh();
        let _ = run.advance(&'S', "S1".to_string());
        assert_eq!(run, fresh());
    }

    #[test]
    fn consistency_rejects_mismatched_counters() {
        let mut run = fresh();
        assert!(run.check_consistency().is_ok());

        run.run_length = 2;
        assert!(run.check_consistency().is_err());

        let mut run = fresh().advance(&'S', "S1".to_string());
        assert!(run.check_consistency().is_ok());
        run.run_length = 0;
        assert!(run.check_consistency().is_err());

        let mut run = fresh().advance(&'S', "S1".to_string());
        run.run_length = 5;
        assert!(run.check_consistency().is_err());
    }

    #[test]
    fn run_state_serializes() {
        let run = fresh().advance(&'S', "S1".to_string());
        let json = serde_json::to_string(&run).unwrap();
        let back: RunState<String, char> = serde_json::from_str(&json).unwrap();
        assert_eq!(run, back);
    }
}
