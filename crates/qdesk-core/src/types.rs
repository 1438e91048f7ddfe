//! State and action vocabulary shared between the portfolio layer and the agent

use serde::{Deserialize, Serialize};

/// Continuous observation of the portfolio and market at one point in time.
///
/// Built by the caller from live positions and market data and passed by
/// value into the decision core. Out-of-range values are clipped during
/// discretization, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RLState {
    /// Net portfolio delta across all positions
    pub portfolio_delta: f64,
    /// Net portfolio gamma
    pub portfolio_gamma: f64,
    /// Net portfolio theta (negative for premium sellers)
    pub portfolio_theta: f64,
    /// Net portfolio vega
    pub portfolio_vega: f64,
    /// Number of open positions
    pub total_positions: u32,
    /// Available cash balance
    pub cash_balance: f64,
    /// Realized profit and loss
    pub total_pnl: f64,

    /// VIX level
    pub vix: f64,
    /// Implied-volatility rank (0-100)
    pub iv_rank: f64,
    /// Recent underlying price change
    pub price_change: f64,
    /// Volume relative to average
    pub volume_ratio: f64,

    /// Delta of the position under consideration, if any
    #[serde(default)]
    pub position_delta: Option<f64>,
    /// Size of the position under consideration
    #[serde(default)]
    pub position_size: Option<f64>,
    /// Days to expiration of the position under consideration
    #[serde(default)]
    pub days_to_expiration: Option<f64>,
    /// Profit percent of the position under consideration
    #[serde(default)]
    pub profit_pct: Option<f64>,
}

impl Default for RLState {
    fn default() -> Self {
        Self {
            portfolio_delta: 0.0,
            portfolio_gamma: 0.0,
            portfolio_theta: 0.0,
            portfolio_vega: 0.0,
            total_positions: 0,
            cash_balance: 0.0,
            total_pnl: 0.0,
            vix: 20.0,
            iv_rank: 50.0,
            price_change: 0.0,
            volume_ratio: 1.0,
            position_delta: None,
            position_size: None,
            days_to_expiration: None,
            profit_pct: None,
        }
    }
}

/// Kind of portfolio action the agent can recommend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Hold,
    Buy,
    Sell,
    Hedge,
    Close,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Hold => "hold",
            ActionKind::Buy => "buy",
            ActionKind::Sell => "sell",
            ActionKind::Hedge => "hedge",
            ActionKind::Close => "close",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hold" => Ok(ActionKind::Hold),
            "buy" => Ok(ActionKind::Buy),
            "sell" => Ok(ActionKind::Sell),
            "hedge" => Ok(ActionKind::Hedge),
            "close" => Ok(ActionKind::Close),
            other => Err(crate::Error::Snapshot(format!(
                "unknown action kind: {other}"
            ))),
        }
    }
}

/// A concrete portfolio action with sizing.
///
/// `size_percent` is 0-100; `hold` always carries 0. `symbol` is filled in
/// by the caller when executing, it does not participate in learning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAction {
    pub kind: ActionKind,
    pub size_percent: f64,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl TradeAction {
    pub fn new(kind: ActionKind, size_percent: f64) -> Self {
        Self {
            kind,
            size_percent,
            symbol: None,
        }
    }

    pub fn hold() -> Self {
        Self::new(ActionKind::Hold, 0.0)
    }

    pub fn buy(size_percent: f64) -> Self {
        Self::new(ActionKind::Buy, size_percent)
    }

    pub fn sell(size_percent: f64) -> Self {
        Self::new(ActionKind::Sell, size_percent)
    }

    pub fn hedge(size_percent: f64) -> Self {
        Self::new(ActionKind::Hedge, size_percent)
    }

    pub fn close(size_percent: f64) -> Self {
        Self::new(ActionKind::Close, size_percent)
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn is_hold(&self) -> bool {
        self.kind == ActionKind::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_carries_zero_size() {
        let action = TradeAction::hold();
        assert_eq!(action.kind, ActionKind::Hold);
        assert_eq!(action.size_percent, 0.0);
        assert!(action.is_hold());
    }

    #[test]
    fn test_action_kind_round_trip() {
        for kind in [
            ActionKind::Hold,
            ActionKind::Buy,
            ActionKind::Sell,
            ActionKind::Hedge,
            ActionKind::Close,
        ] {
            let parsed: ActionKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("short_strangle".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_action_with_symbol() {
        let action = TradeAction::buy(50.0).with_symbol("SPY");
        assert_eq!(action.symbol.as_deref(), Some("SPY"));
        assert_eq!(action.size_percent, 50.0);
    }

    #[test]
    fn test_state_serialization() {
        let state = RLState {
            portfolio_delta: 120.0,
            total_positions: 3,
            cash_balance: 25_000.0,
            ..RLState::default()
        };

        let json = serde_json::to_string(&state).unwrap();
        let parsed: RLState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_state_optional_fields_default() {
        // Older callers omit the per-position fields entirely
        let json = r#"{
            "portfolio_delta": 10.0,
            "portfolio_gamma": 1.0,
            "portfolio_theta": -50.0,
            "portfolio_vega": 20.0,
            "total_positions": 2,
            "cash_balance": 10000.0,
            "total_pnl": 150.0,
            "vix": 18.0,
            "iv_rank": 40.0,
            "price_change": 0.2,
            "volume_ratio": 1.1
        }"#;
        let state: RLState = serde_json::from_str(json).unwrap();
        assert!(state.position_delta.is_none());
        assert!(state.days_to_expiration.is_none());
    }
}
