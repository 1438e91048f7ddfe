//! Sparse Q-table over discretized states and bucketed actions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::action::ActionKey;
use crate::state::StateKey;

/// Learned value and visit count for one (state, action) cell.
///
/// Updated in place and never removed; the table only grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QValue {
    pub value: f64,
    pub visits: u64,
}

/// Sparse mapping from state key to per-action values. Rows and cells are
/// created lazily, only for states and actions actually visited.
#[derive(Debug, Clone, Default)]
pub struct QTable {
    rows: HashMap<StateKey, HashMap<ActionKey, QValue>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, state: &StateKey, action: &ActionKey) -> Option<&QValue> {
        self.rows.get(state).and_then(|row| row.get(action))
    }

    /// Cell accessor for updates, zero-initialized on first touch.
    pub fn entry(&mut self, state: StateKey, action: ActionKey) -> &mut QValue {
        self.rows.entry(state).or_default().entry(action).or_default()
    }

    pub fn row(&self, state: &StateKey) -> Option<&HashMap<ActionKey, QValue>> {
        self.rows.get(state)
    }

    /// Highest stored value among recorded actions for a state.
    /// Absent or empty rows bootstrap at 0 (optimistic-neutral).
    pub fn max_value(&self, state: &StateKey) -> f64 {
        self.rows
            .get(state)
            .filter(|row| !row.is_empty())
            .map(|row| {
                row.values()
                    .map(|q| q.value)
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .unwrap_or(0.0)
    }

    /// Number of state rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &HashMap<ActionKey, QValue>)> {
        self.rows.iter()
    }
}

impl FromIterator<(StateKey, HashMap<ActionKey, QValue>)> for QTable {
    fn from_iter<I: IntoIterator<Item = (StateKey, HashMap<ActionKey, QValue>)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
