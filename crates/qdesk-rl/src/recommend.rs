//! Non-exploratory recommendations with confidence and rationale

use serde::Serialize;

use qdesk_core::{ActionKind, RLState, TradeAction};

use crate::action::ActionKey;
use crate::engine::QAgent;
use crate::qtable::QValue;

/// A production recommendation: greedy action, confidence score (0-100),
/// the underlying Q-value, and a templated human-readable rationale.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub action: TradeAction,
    pub confidence: f64,
    pub q_value: f64,
    pub explanation: String,
}

impl QAgent {
    /// Produce the greedy action for a state together with an explanation.
    ///
    /// A totally unseen state yields `hold` with zero confidence and zero
    /// Q-value, a defined default rather than a failure.
    pub fn recommend(&self, state: &RLState) -> Recommendation {
        let action = self.select_action(state, false);

        let state_key = self.config.discretizer.discretize(state);
        let action_key = ActionKey::from_action(&action);
        let cell = self
            .q_table
            .get(&state_key, &action_key)
            .copied()
            .unwrap_or_default();

        Recommendation {
            explanation: explain(state, &action, &cell),
            confidence: confidence(&cell),
            q_value: cell.value,
            action,
        }
    }
}

/// Blend of sample count and signal strength, saturating at 100
fn confidence(cell: &QValue) -> f64 {
    let visit_part = (cell.visits as f64 / 10.0) * 50.0;
    let signal_part = (cell.value.abs() * 10.0).min(50.0);
    (visit_part + signal_part).min(100.0)
}

fn explain(state: &RLState, action: &TradeAction, cell: &QValue) -> String {
    let body = match action.kind {
        ActionKind::Hold => format!(
            "Hold: no position change with ${:.0} cash and {:.0} daily theta.",
            state.cash_balance, state.portfolio_theta
        ),
        ActionKind::Buy => format!(
            "Buy at {:.0}% size: ${:.0} cash available with IV rank at {:.0}.",
            action.size_percent, state.cash_balance, state.iv_rank
        ),
        ActionKind::Sell => format!(
            "Sell {:.0}% of the position: P&L is {} with VIX at {:.1}.",
            action.size_percent,
            pnl_word(state.total_pnl),
            state.vix
        ),
        ActionKind::Close => format!(
            "Close {:.0}% of the position: P&L is {} with VIX at {:.1}.",
            action.size_percent,
            pnl_word(state.total_pnl),
            state.vix
        ),
        ActionKind::Hedge => format!(
            "Hedge {:.0}% of delta exposure: portfolio delta is {:+.0}.",
            action.size_percent, state.portfolio_delta
        ),
    };

    let tail = if cell.value >= 0.0 {
        format!(" Expected value is positive (Q={:+.2}).", cell.value)
    } else {
        format!(" Carries downside risk (Q={:+.2}).", cell.value)
    };

    body + &tail
}

fn pnl_word(pnl: f64) -> &'static str {
    if pnl >= 0.0 {
        "positive"
    } else {
        "negative"
    }
}
