//! Runtime that steps a transition table through an input stream.

use crate::checkpoint::{CheckpointError, Snapshot};
use crate::core::{label, AnomalyEvent, RunState, State, StepOutcome, Symbol, TriggerPolicy};
use crate::machine::error::{RuntimeError, StepError};
use crate::machine::table::TransitionTable;
use tracing::{info, trace};

/// Executes a transition table one symbol at a time.
///
/// The runtime owns its table and its run state. `step` is all-or-nothing:
/// on error the run state is exactly what it was before the call.
///
/// # Example
///
/// ```rust
/// use streakfsm::builder::StreakDetector;
/// use streakfsm::machine::Runtime;
///
/// let detector = StreakDetector::new(vec!['S', 'L']);
/// let mut runtime = Runtime::from_table(detector.table().unwrap(), detector.policy()).unwrap();
///
/// let outcomes = runtime.run("LLLS".chars()).unwrap();
/// let events: Vec<u64> = outcomes
///     .iter()
///     .filter_map(|o| o.event.as_ref().map(|e| e.position))
///     .collect();
///
/// assert_eq!(events, vec![2]);
/// assert_eq!(runtime.current_state(), "S1");
/// ```
#[derive(Clone, Debug)]
pub struct Runtime<S: State, Y: Symbol> {
    table: TransitionTable<S, Y>,
    initial: S,
    policy: TriggerPolicy,
    run: RunState<S, Y>,
}

impl<S: State, Y: Symbol> Runtime<S, Y> {
    /// Create a runtime positioned at `initial_state`.
    pub fn new(
        table: TransitionTable<S, Y>,
        initial_state: S,
        policy: TriggerPolicy,
    ) -> Result<Self, RuntimeError> {
        if !table.contains_state(&initial_state) {
            return Err(RuntimeError::UnknownInitialState {
                state: label(&initial_state),
            });
        }
        if let TriggerPolicy::RunLength { threshold: 0 } = policy {
            return Err(RuntimeError::InvalidThreshold { threshold: 0 });
        }

        Ok(Self {
            run: RunState::new(initial_state.clone()),
            table,
            initial: initial_state,
            policy,
        })
    }

    /// Create a runtime positioned at the table's own initial state.
    pub fn from_table(table: TransitionTable<S, Y>, policy: TriggerPolicy) -> Result<Self, RuntimeError> {
        let initial = table.initial_state().clone();
        Self::new(table, initial, policy)
    }

    /// Consume one symbol.
    pub fn step(&mut self, symbol: Y) -> Result<StepOutcome<S, Y>, StepError> {
        let next = self.table.lookup(&self.run.current_state, &symbol)?.clone();

        let position = self.run.position;
        let mut run = self.run.advance(&symbol, next);

        let event = if self.policy.fires(&run) {
            run.latched = true;
            Some(AnomalyEvent {
                symbol: symbol.clone(),
                run_length: run.run_length,
                position,
            })
        } else {
            None
        };

        let from = std::mem::replace(&mut self.run, run).current_state;

        trace!(
            position,
            from = ?from,
            symbol = ?symbol,
            to = ?self.run.current_state,
            "Step"
        );
        if let Some(event) = &event {
            info!(
                position,
                symbol = ?event.symbol,
                run_length = event.run_length,
                "Anomaly detected"
            );
        }

        Ok(StepOutcome {
            from,
            symbol,
            state: self.run.current_state.clone(),
            position,
            event,
        })
    }

    /// Step through `inputs` in order, collecting outcomes.
    ///
    /// Stops at the first failing symbol; the steps before it stay applied.
    pub fn run<I>(&mut self, inputs: I) -> Result<Vec<StepOutcome<S, Y>>, StepError>
    where
        I: IntoIterator<Item = Y>,
    {
        inputs.into_iter().map(|symbol| self.step(symbol)).collect()
    }

    /// Return to the initial state with a cleared run.
    pub fn reset(&mut self) {
        self.run = RunState::new(self.initial.clone());
    }

    /// Versioned copy of the run state for persistence.
    pub fn snapshot(&self) -> Snapshot<S, Y> {
        Snapshot::capture(self.run.clone(), &self.table)
    }

    /// Replace the run state with a persisted one.
    ///
    /// The snapshot is validated against this runtime's table and policy
    /// first; if it is rejected the current run state is kept.
    pub fn restore(&mut self, snapshot: Snapshot<S, Y>) -> Result<(), CheckpointError> {
        snapshot.validate_against(&self.table, &self.policy)?;
        self.run = snapshot.run;
        Ok(())
    }

    /// Get current state (pure)
    pub fn current_state(&self) -> &S {
        &self.run.current_state
    }

    /// Output label of the current state, if it has one.
    pub fn current_output(&self) -> Option<&str> {
        self.table.output(&self.run.current_state)
    }

    /// Check if the current state is accepting.
    pub fn is_accepting(&self) -> bool {
        self.table.is_accepting(&self.run.current_state)
    }

    pub fn run_state(&self) -> &RunState<S, Y> {
        &self.run
    }

    pub fn table(&self) -> &TransitionTable<S, Y> {
        &self.table
    }

    pub fn policy(&self) -> &TriggerPolicy {
        &self.policy
    }

    pub fn initial_state(&self) -> &S {
        &self.initial
    }
}
