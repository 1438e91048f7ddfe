//! Action enumeration and the Q-table action key

use serde::{Deserialize, Serialize};

use qdesk_core::{ActionKind, Error, RLState, TradeAction};

use crate::config::ActionConfig;

/// Size steps offered for buy/sell/close actions, in percent
const SIZE_STEPS: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 100.0];

/// Size steps offered for hedges, in percent
const HEDGE_STEPS: [f64; 2] = [50.0, 100.0];

/// Coarse action index for the Q-table: kind plus size rounded to the
/// nearest 10 percent, so minor sizing differences share learned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionKey {
    pub kind: ActionKind,
    pub size_bucket: u8,
}

impl ActionKey {
    pub fn from_action(action: &TradeAction) -> Self {
        let bucket = ((action.size_percent / 10.0).round() * 10.0).clamp(0.0, 100.0) as u8;
        Self {
            kind: action.kind,
            size_bucket: if action.kind == ActionKind::Hold {
                0
            } else {
                bucket
            },
        }
    }
}

impl std::fmt::Display for ActionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.kind, self.size_bucket)
    }
}

impl std::str::FromStr for ActionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, bucket) = s
            .rsplit_once('_')
            .ok_or_else(|| Error::Snapshot(format!("bad action key: {s}")))?;
        Ok(Self {
            kind: kind.parse()?,
            size_bucket: bucket
                .parse()
                .map_err(|_| Error::Snapshot(format!("bad action size bucket: {bucket}")))?,
        })
    }
}

/// Enumerate the actions that are structurally valid for the current
/// portfolio state, in fixed canonical order (hold, buys ascending, sells,
/// closes, hedges). The order is the greedy tie-break order.
///
/// `hold` is always legal. Buys require cash above the floor and headroom
/// under the position cap; sells and closes require an open position;
/// hedges require delta beyond the configured threshold.
pub fn legal_actions(state: &RLState, config: &ActionConfig) -> Vec<TradeAction> {
    let mut actions = vec![TradeAction::hold()];

    if state.cash_balance >= config.min_cash && state.total_positions < config.max_open_positions {
        for step in SIZE_STEPS {
            actions.push(TradeAction::buy(step * config.max_position_frac));
        }
    }

    if state.total_positions > 0 {
        for step in SIZE_STEPS {
            actions.push(TradeAction::sell(step));
        }
        for step in SIZE_STEPS {
            actions.push(TradeAction::close(step));
        }
    }

    if state.portfolio_delta.abs() > config.hedge_delta_threshold {
        for step in HEDGE_STEPS {
            actions.push(TradeAction::hedge(step));
        }
    }

    actions
}
