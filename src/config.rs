//! Declarative machine configuration.
//!
//! A [`MachineConfig`] describes everything needed to rebuild a runtime on
//! start: the table, the trigger policy and where checkpoints live. It is
//! plain serde data, loaded from JSON.
//!
//! ```json
//! {
//!   "machine_id": "line-1",
//!   "alphabet": ["S", "L"],
//!   "states": ["Q0", "S1", "L1"],
//!   "initial_state": "Q0",
//!   "edges": [
//!     { "from": "Q0", "symbol": "S", "to": "S1" },
//!     { "from": "Q0", "symbol": "L", "to": "L1" }
//!   ],
//!   "missing_transitions": "stay",
//!   "trigger": { "run_length": { "threshold": 3 } },
//!   "checkpoint": { "dir": "/var/lib/line-1", "format": "json", "every": 10 }
//! }
//! ```

use crate::builder::{Edge, TableBuilder, TableError};
use crate::checkpoint::{Checkpointer, FileStore, SnapshotFormat, StoreError};
use crate::core::{State, Symbol, TriggerPolicy};
use crate::machine::{MissingTransitions, Runtime, RuntimeError, TransitionTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Output label attached to a state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct OutputLabel<S: State> {
    pub state: S,
    pub label: String,
}

/// Where and how often a machine is checkpointed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Directory holding one snapshot file per machine
    pub dir: PathBuf,

    #[serde(default)]
    pub format: SnapshotFormat,

    /// Steps between saves; 0 saves only when a drive finishes
    #[serde(default = "default_every")]
    pub every: u64,
}

fn default_every() -> u64 {
    1
}

/// Complete description of one machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MachineConfig<S: State, Y: Symbol> {
    /// Key under which checkpoints are stored
    pub machine_id: String,

    pub alphabet: Vec<Y>,

    pub states: Vec<S>,

    pub initial_state: S,

    pub edges: Vec<Edge<S, Y>>,

    #[serde(default)]
    pub missing_transitions: MissingTransitions<S>,

    #[serde(default)]
    pub strict_reachability: bool,

    #[serde(default)]
    pub outputs: Vec<OutputLabel<S>>,

    #[serde(default)]
    pub accepting_states: Vec<S>,

    #[serde(default)]
    pub trigger: TriggerPolicy,

    #[serde(default)]
    pub checkpoint: Option<CheckpointConfig>,
}

impl<S: State, Y: Symbol> MachineConfig<S, Y> {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder pre-loaded with this configuration's table declarations.
    pub fn table_builder(&self) -> TableBuilder<S, Y> {
        let builder = TableBuilder::new()
            .states(self.states.iter().cloned())
            .alphabet(self.alphabet.iter().cloned())
            .edges(self.edges.iter().cloned())
            .initial(self.initial_state.clone())
            .on_missing(self.missing_transitions.clone())
            .strict_reachability(self.strict_reachability)
            .accepting(self.accepting_states.iter().cloned());

        self.outputs.iter().fold(builder, |builder, output| {
            builder.output(output.state.clone(), output.label.clone())
        })
    }

    pub fn build_table(&self) -> Result<TransitionTable<S, Y>, ConfigError> {
        Ok(self.table_builder().build()?)
    }

    /// Build the table and a fresh runtime at the initial state.
    pub fn build_runtime(&self) -> Result<Runtime<S, Y>, ConfigError> {
        let table = self.build_table()?;
        Ok(Runtime::new(table, self.initial_state.clone(), self.trigger)?)
    }

    /// File-backed checkpointer for this machine, if checkpointing is configured.
    pub fn checkpointer(&self) -> Result<Option<Checkpointer>, ConfigError> {
        let Some(checkpoint) = &self.checkpoint else {
            return Ok(None);
        };
        let store = FileStore::open(&checkpoint.dir)?.with_extension(checkpoint.format.extension());
        Ok(Some(
            Checkpointer::new(store, self.machine_id.clone())
                .format(checkpoint.format)
                .every(checkpoint.every),
        ))
    }

    /// Export the configuration a runtime is running with.
    ///
    /// Tables built with `ErrorState` export the sink and its filled-in
    /// edges explicitly. Reachability strictness is not kept by the table
    /// and is exported as `false`.
    pub fn from_runtime(machine_id: impl Into<String>, runtime: &Runtime<S, Y>) -> Self {
        let table = runtime.table();
        Self {
            machine_id: machine_id.into(),
            alphabet: table.alphabet().to_vec(),
            states: table.states().to_vec(),
            initial_state: runtime.initial_state().clone(),
            edges: table.edges(),
            missing_transitions: table.missing_transitions().clone(),
            strict_reachability: false,
            outputs: table
                .outputs()
                .into_iter()
                .map(|(state, label)| OutputLabel {
                    state: state.clone(),
                    label: label.to_string(),
                })
                .collect(),
            accepting_states: table.accepting_states().into_iter().cloned().collect(),
            trigger: *runtime.policy(),
            checkpoint: None,
        }
    }
}
