//! Checkpoint and resume functionality for runtimes.
//!
//! A [`Snapshot`] wraps the run state in a versioned envelope. Snapshots can
//! be encoded as JSON for readability or with bincode for compactness, and
//! are kept in a [`SnapshotStore`] keyed by machine id. The transition table
//! is never persisted; it is rebuilt from configuration on every start and
//! each restored snapshot is checked against it.

use crate::core::{label, RunState, State, Symbol, TriggerPolicy};
use crate::machine::{Runtime, TransitionTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

pub mod error;
pub mod store;

pub use error::{CheckpointError, StoreError};
pub use store::{FileStore, MemoryStore, SnapshotStore};

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a runtime's run state.
///
/// `version` is the first field so it can be read before the rest of the
/// payload is decoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Snapshot<S: State, Y: Symbol> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Fingerprint of the table the run state belongs to
    pub table_fingerprint: String,

    /// The run state itself
    pub run: RunState<S, Y>,
}

impl<S: State, Y: Symbol> Snapshot<S, Y> {
    /// Wrap a run state stepped through `table` in a fresh envelope.
    pub fn capture(run: RunState<S, Y>, table: &TransitionTable<S, Y>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            table_fingerprint: table.fingerprint().to_string(),
            run,
        }
    }

    /// Check the snapshot can be restored into a runtime built from
    /// `table` with `policy`.
    pub fn validate_against(
        &self,
        table: &TransitionTable<S, Y>,
        policy: &TriggerPolicy,
    ) -> Result<(), CheckpointError> {
        let invalid = |reason: String| CheckpointError::InvalidSnapshot { reason };

        // Decoding checks this too; snapshots can also be built in memory.
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        if self.table_fingerprint != table.fingerprint() {
            return Err(invalid(format!(
                "snapshot was taken against table {}, current table is {}",
                self.table_fingerprint,
                table.fingerprint()
            )));
        }

        let run = &self.run;
        if !table.contains_state(&run.current_state) {
            return Err(invalid(format!(
                "state {} is not part of the transition table",
                label(&run.current_state)
            )));
        }
        if let Some(symbol) = &run.last_symbol {
            if !table.contains_symbol(symbol) {
                return Err(invalid(format!(
                    "last symbol {} is not part of the alphabet",
                    label(symbol)
                )));
            }
        }
        run.check_consistency().map_err(invalid)?;

        if run.latched {
            match policy.threshold() {
                None => {
                    return Err(invalid(
                        "latch is set but anomaly detection is disabled".to_string(),
                    ))
                }
                Some(threshold) if run.run_length < threshold => {
                    return Err(invalid(format!(
                        "latch is set at run length {} below threshold {threshold}",
                        run.run_length
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

/// Encoding used for persisted snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotFormat {
    /// Human-readable JSON
    #[default]
    Json,

    /// Compact bincode
    Binary,
}

impl SnapshotFormat {
    /// File extension used by [`FileStore`] for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Binary => "bin",
        }
    }

    pub fn encode<S: State, Y: Symbol>(
        &self,
        snapshot: &Snapshot<S, Y>,
    ) -> Result<Vec<u8>, CheckpointError> {
        match self {
            Self::Json => serde_json::to_vec_pretty(snapshot)
                .map_err(|e| CheckpointError::SerializationFailed(e.to_string())),
            Self::Binary => bincode::serialize(snapshot)
                .map_err(|e| CheckpointError::SerializationFailed(e.to_string())),
        }
    }

    /// Decode a snapshot, checking the version before the payload.
    pub fn decode<S: State, Y: Symbol>(
        &self,
        bytes: &[u8],
    ) -> Result<Snapshot<S, Y>, CheckpointError> {
        let failed = |e: String| CheckpointError::DeserializationFailed(e);

        let version = match self {
            Self::Json => {
                let value: serde_json::Value =
                    serde_json::from_slice(bytes).map_err(|e| failed(e.to_string()))?;
                value
                    .get("version")
                    .and_then(serde_json::Value::as_u64)
                    .ok_or_else(|| failed("missing version field".to_string()))?
            }
            Self::Binary => {
                u64::from(bincode::deserialize::<u32>(bytes).map_err(|e| failed(e.to_string()))?)
            }
        };
        if version != u64::from(CHECKPOINT_VERSION) {
            return Err(CheckpointError::UnsupportedVersion {
                found: u32::try_from(version).unwrap_or(u32::MAX),
                supported: CHECKPOINT_VERSION,
            });
        }

        match self {
            Self::Json => serde_json::from_slice(bytes).map_err(|e| failed(e.to_string())),
            Self::Binary => bincode::deserialize(bytes).map_err(|e| failed(e.to_string())),
        }
    }
}

/// Saves and restores one machine's snapshots through a store.
pub struct Checkpointer {
    store: Box<dyn SnapshotStore>,
    machine_id: String,
    format: SnapshotFormat,
    every: u64,
}

impl Checkpointer {
    /// Checkpointer saving after every step in JSON.
    pub fn new(store: impl SnapshotStore + 'static, machine_id: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            machine_id: machine_id.into(),
            format: SnapshotFormat::Json,
            every: 1,
        }
    }

    pub fn format(mut self, format: SnapshotFormat) -> Self {
        self.format = format;
        self
    }

    /// Save after every `n` steps; 0 saves only when a drive finishes.
    pub fn every(mut self, n: u64) -> Self {
        self.every = n;
        self
    }

    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    pub fn interval(&self) -> u64 {
        self.every
    }

    /// Persist the runtime's current run state.
    pub fn save<S: State, Y: Symbol>(&self, runtime: &Runtime<S, Y>) -> Result<(), CheckpointError> {
        let snapshot = runtime.snapshot();
        let bytes = self.format.encode(&snapshot)?;
        self.store.write(&self.machine_id, &bytes)?;
        info!(
            machine_id = %self.machine_id,
            snapshot_id = %snapshot.id,
            position = snapshot.run.position,
            "Saved checkpoint"
        );
        Ok(())
    }

    /// Load the last persisted snapshot, if any.
    pub fn load<S: State, Y: Symbol>(&self) -> Result<Option<Snapshot<S, Y>>, CheckpointError> {
        match self.store.read(&self.machine_id)? {
            Some(bytes) => self.format.decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Restore the last persisted snapshot into `runtime`.
    ///
    /// Returns `false` when nothing was persisted yet. A snapshot that
    /// cannot be decoded or does not fit the runtime is an error; the
    /// runtime is left untouched.
    pub fn restore_into<S: State, Y: Symbol>(
        &self,
        runtime: &mut Runtime<S, Y>,
    ) -> Result<bool, CheckpointError> {
        let Some(snapshot) = self.load()? else {
            return Ok(false);
        };
        let snapshot_id = snapshot.id.clone();

        runtime.restore(snapshot).inspect_err(|e| {
            warn!(machine_id = %self.machine_id, error = %e, "Refusing persisted snapshot");
        })?;

        info!(
            machine_id = %self.machine_id,
            snapshot_id = %snapshot_id,
            position = runtime.run_state().position,
            "Restored checkpoint"
        );
        Ok(true)
    }

    /// Delete the persisted snapshot. Returns `false` if none existed.
    pub fn clear(&self) -> Result<bool, CheckpointError> {
        Ok(self.store.remove(&self.machine_id)?)
    }
}
