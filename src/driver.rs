//! Imperative shell: feeds a symbol source through a runtime.
//!
//! The [`Runtime`] is pure apart from logging. The [`Driver`] adds the side
//! effects around it: pulling symbols from a source, handing anomaly events
//! to an [`EventSink`] and saving checkpoints on a schedule.

use crate::checkpoint::{CheckpointError, Checkpointer};
use crate::config::{ConfigError, MachineConfig};
use crate::core::{AnomalyEvent, State, Symbol};
use crate::machine::{Runtime, StepError};
use thiserror::Error;
use tracing::{debug, warn};

/// Receives anomaly events as they are emitted.
pub trait EventSink<Y: Symbol> {
    fn emit(&mut self, event: AnomalyEvent<Y>);
}

impl<Y: Symbol, F: FnMut(AnomalyEvent<Y>)> EventSink<Y> for F {
    fn emit(&mut self, event: AnomalyEvent<Y>) {
        self(event)
    }
}

/// Sink that keeps every event in memory.
#[derive(Clone, Debug)]
pub struct CollectingSink<Y: Symbol> {
    events: Vec<AnomalyEvent<Y>>,
}

impl<Y: Symbol> CollectingSink<Y> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[AnomalyEvent<Y>] {
        &self.events
    }

    pub fn into_events(self) -> Vec<AnomalyEvent<Y>> {
        self.events
    }
}

impl<Y: Symbol> Default for CollectingSink<Y> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Y: Symbol> EventSink<Y> for CollectingSink<Y> {
    fn emit(&mut self, event: AnomalyEvent<Y>) {
        self.events.push(event);
    }
}

/// Errors that stop a drive.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

/// Counters for one call to [`Driver::drive`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriveSummary {
    pub steps: u64,
    pub events: u64,
    pub checkpoints: u64,
}

/// Runs a runtime over a symbol source with optional checkpointing.
///
/// # Example
///
/// ```rust
/// use streakfsm::builder::StreakDetector;
/// use streakfsm::driver::{CollectingSink, Driver};
/// use streakfsm::machine::Runtime;
///
/// let detector = StreakDetector::new(vec!['S', 'L']);
/// let runtime = Runtime::from_table(detector.table().unwrap(), detector.policy()).unwrap();
///
/// let mut driver = Driver::new(runtime);
/// let mut sink = CollectingSink::new();
/// let summary = driver.drive("SSSL".chars(), &mut sink).unwrap();
///
/// assert_eq!(summary.steps, 4);
/// assert_eq!(sink.events()[0].position, 2);
/// ```
pub struct Driver<S: State, Y: Symbol> {
    runtime: Runtime<S, Y>,
    checkpointer: Option<Checkpointer>,
    since_save: u64,
}

impl<S: State, Y: Symbol> Driver<S, Y> {
    pub fn new(runtime: Runtime<S, Y>) -> Self {
        Self {
            runtime,
            checkpointer: None,
            since_save: 0,
        }
    }

    pub fn with_checkpointer(mut self, checkpointer: Checkpointer) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    /// Build the runtime and, if configured, a file-backed checkpointer.
    pub fn from_config(config: &MachineConfig<S, Y>) -> Result<Self, ConfigError> {
        let driver = Self::new(config.build_runtime()?);
        Ok(match config.checkpointer()? {
            Some(checkpointer) => driver.with_checkpointer(checkpointer),
            None => driver,
        })
    }

    /// Restore the last persisted run state, if any.
    ///
    /// Returns `false` without a checkpointer or without a saved snapshot.
    /// An incompatible snapshot is an error and leaves the runtime untouched.
    pub fn resume(&mut self) -> Result<bool, CheckpointError> {
        match &self.checkpointer {
            Some(checkpointer) => checkpointer.restore_into(&mut self.runtime),
            None => Ok(false),
        }
    }

    /// Step through `source` until it is exhausted or a step fails.
    ///
    /// Progress made before a failing symbol is checkpointed before the
    /// step error is returned. If that save fails it is logged and the step
    /// error is still the one returned. Events reach `sink` before the step that produced
    /// them is checkpointed.
    pub fn drive<I, K>(&mut self, source: I, sink: &mut K) -> Result<DriveSummary, DriveError>
    where
        I: IntoIterator<Item = Y>,
        K: EventSink<Y> + ?Sized,
    {
        let mut summary = DriveSummary::default();

        for symbol in source {
            let outcome = match self.runtime.step(symbol) {
                Ok(outcome) => outcome,
                Err(e) => {
                    if self.since_save > 0 {
                        match self.checkpoint() {
                            Ok(true) => summary.checkpoints += 1,
                            Ok(false) => {}
                            Err(save_err) => warn!(
                                error = %save_err,
                                "Failed to checkpoint progress before step error"
                            ),
                        }
                    }
                    return Err(e.into());
                }
            };

            summary.steps += 1;
            self.since_save += 1;
            if let Some(event) = outcome.event {
                summary.events += 1;
                sink.emit(event);
            }

            let due = self
                .checkpointer
                .as_ref()
                .is_some_and(|c| c.interval() > 0 && self.since_save >= c.interval());
            if due && self.checkpoint()? {
                summary.checkpoints += 1;
            }
        }

        if self.since_save > 0 && self.checkpoint()? {
            summary.checkpoints += 1;
        }

        debug!(
            steps = summary.steps,
            events = summary.events,
            checkpoints = summary.checkpoints,
            "Source exhausted"
        );
        Ok(summary)
    }

    /// Save the current run state now. Returns `false` without a checkpointer.
    pub fn checkpoint(&mut self) -> Result<bool, CheckpointError> {
        let Some(checkpointer) = &self.checkpointer else {
            return Ok(false);
        };
        checkpointer.save(&self.runtime)?;
        self.since_save = 0;
        Ok(true)
    }

    pub fn runtime(&self) -> &Runtime<S, Y> {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime<S, Y> {
        &mut self.runtime
    }

    pub fn into_runtime(self) -> Runtime<S, Y> {
        self.runtime
    }
}
