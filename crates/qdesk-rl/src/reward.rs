//! Reward shaping for portfolio state transitions

use qdesk_core::{ActionKind, RLState, TradeAction};

use crate::config::RewardConfig;

/// Score a state transition. Deterministic given inputs and weights;
/// all terms are additive so each can be tuned and tested in isolation.
pub fn shape(
    config: &RewardConfig,
    state: &RLState,
    action: &TradeAction,
    next_state: &RLState,
) -> f64 {
    let mut reward = (next_state.total_pnl - state.total_pnl) * config.profit_weight;

    // Transaction cost on any non-hold action, proportional to deployed size
    if action.kind != ActionKind::Hold {
        reward -=
            config.transaction_cost * (action.size_percent / 100.0) * state.cash_balance.abs();
    }

    // Delta risk beyond the configured band
    let next_delta = next_state.portfolio_delta.abs();
    if next_delta > config.max_portfolio_delta {
        reward -= config.delta_risk_penalty * (next_delta - config.max_portfolio_delta);
    }

    // Flat gamma penalty
    if next_state.portfolio_gamma.abs() > config.gamma_limit {
        reward -= config.gamma_risk_penalty;
    }

    // Drawdown beyond the tolerated percent of cash
    if next_state.total_pnl < 0.0
        && next_state.total_pnl < state.total_pnl
        && state.cash_balance != 0.0
    {
        let drawdown_pct = (next_state.total_pnl / state.cash_balance).abs() * 100.0;
        if drawdown_pct > config.drawdown_limit_pct {
            reward -= config.drawdown_penalty * (drawdown_pct - config.drawdown_limit_pct);
        }
    }

    // Over-trading
    if next_state.total_positions > config.position_soft_cap {
        reward -= config.overtrade_penalty
            * f64::from(next_state.total_positions - config.position_soft_cap);
    }

    // Theta-collection carry: reward holding short premium
    if state.portfolio_theta < 0.0 {
        reward += state.portfolio_theta.abs() * config.theta_bonus;
    }

    // Hedge efficacy: the hedge actually reduced delta exposure
    if action.kind == ActionKind::Hedge
        && next_state.portfolio_delta.abs() < state.portfolio_delta.abs()
    {
        reward += config.hedge_bonus;
    }

    reward
}
