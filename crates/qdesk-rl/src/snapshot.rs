//! Versioned model snapshots - persistence boundary for the learned policy

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use qdesk_core::{Error, Result};

use crate::action::ActionKey;
use crate::engine::QAgent;
use crate::qtable::{QTable, QValue};
use crate::state::StateKey;

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable snapshot of the learned state: the full Q-table, the
/// current exploration rate, and a count of buffered experiences.
///
/// Keys are rendered as strings ("3-2-9-..." / "hedge_50") because JSON
/// map keys must be strings; they parse back into the typed keys on import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub epsilon: f64,
    pub experience_count: usize,
    pub q_table: HashMap<String, HashMap<String, QValue>>,
}

impl QAgent {
    /// Export the learned state as an opaque blob. The caller owns storage
    /// and retrieval; the core does no I/O.
    pub fn export_model(&self) -> Result<String> {
        let q_table = self
            .q_table
            .iter()
            .map(|(state, row)| {
                let row = row
                    .iter()
                    .map(|(action, cell)| (action.to_string(), *cell))
                    .collect();
                (state.to_string(), row)
            })
            .collect();

        let snapshot = ModelSnapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            epsilon: self.epsilon,
            experience_count: self.buffer.len(),
            q_table,
        };

        info!(
            states = snapshot.q_table.len(),
            epsilon = snapshot.epsilon,
            "exported model snapshot"
        );

        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Replace the in-memory Q-table and epsilon from a snapshot blob.
    ///
    /// Parse-then-swap: the blob is fully decoded and every key validated
    /// into a staging table before anything live is touched, so a partial
    /// or malformed blob leaves the existing state untouched.
    pub fn import_model(&mut self, blob: &str) -> Result<()> {
        let snapshot: ModelSnapshot = serde_json::from_str(blob)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::Snapshot(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        if !(0.0..=1.0).contains(&snapshot.epsilon) {
            return Err(Error::Snapshot(format!(
                "epsilon out of range: {}",
                snapshot.epsilon
            )));
        }

        let mut staged = Vec::with_capacity(snapshot.q_table.len());
        for (state, row) in &snapshot.q_table {
            let state_key: StateKey = state.parse()?;
            let mut cells = HashMap::with_capacity(row.len());
            for (action, cell) in row {
                let action_key: ActionKey = action.parse()?;
                cells.insert(action_key, *cell);
            }
            staged.push((state_key, cells));
        }

        self.q_table = staged.into_iter().collect::<QTable>();
        self.epsilon = snapshot.epsilon;

        info!(
            states = self.q_table.len(),
            epsilon = self.epsilon,
            "imported model snapshot"
        );

        Ok(())
    }
}
