//! Agent configuration with construction-time validation

use serde::{Deserialize, Serialize};

use qdesk_core::{Error, Result};

use crate::state::Discretizer;

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// TD learning rate (alpha)
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Discount factor (gamma)
    #[serde(default = "default_discount_factor")]
    pub discount_factor: f64,

    /// Initial exploration rate (epsilon)
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Multiplicative epsilon decay applied after every learn call
    #[serde(default = "default_epsilon_decay")]
    pub epsilon_decay: f64,

    /// Exploration floor
    #[serde(default = "default_epsilon_min")]
    pub epsilon_min: f64,

    /// Replay batch size
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Experience buffer capacity
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Reward shaping weights and thresholds
    #[serde(default)]
    pub reward: RewardConfig,

    /// Action legality constraints
    #[serde(default)]
    pub actions: ActionConfig,

    /// State discretization ranges and bin counts
    #[serde(default)]
    pub discretizer: Discretizer,
}

fn default_learning_rate() -> f64 {
    0.1
}
fn default_discount_factor() -> f64 {
    0.95
}
fn default_epsilon() -> f64 {
    0.1
}
fn default_epsilon_decay() -> f64 {
    0.995
}
fn default_epsilon_min() -> f64 {
    0.01
}
fn default_batch_size() -> usize {
    32
}
fn default_buffer_capacity() -> usize {
    10_000
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            discount_factor: default_discount_factor(),
            epsilon: default_epsilon(),
            epsilon_decay: default_epsilon_decay(),
            epsilon_min: default_epsilon_min(),
            batch_size: default_batch_size(),
            buffer_capacity: default_buffer_capacity(),
            reward: RewardConfig::default(),
            actions: ActionConfig::default(),
            discretizer: Discretizer::default(),
        }
    }
}

impl AgentConfig {
    /// Validate all numeric parameters. Invalid configuration is a
    /// construction-time error, not a runtime one.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::Config(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(Error::Config(format!(
                "discount_factor must be in [0, 1], got {}",
                self.discount_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::Config(format!(
                "epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(Error::Config(format!(
                "epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon_min) {
            return Err(Error::Config(format!(
                "epsilon_min must be in [0, 1], got {}",
                self.epsilon_min
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        if self.buffer_capacity < self.batch_size {
            return Err(Error::Config(format!(
                "buffer_capacity ({}) must be >= batch_size ({})",
                self.buffer_capacity, self.batch_size
            )));
        }
        self.actions.validate()?;
        self.discretizer.validate()?;
        Ok(())
    }
}

/// Reward shaping weights, penalties, and thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Weight on realized P&L change
    #[serde(default = "default_profit_weight")]
    pub profit_weight: f64,

    /// Fractional transaction cost charged against deployed size
    #[serde(default = "default_transaction_cost")]
    pub transaction_cost: f64,

    /// Portfolio delta magnitude above which risk is penalized
    #[serde(default = "default_max_portfolio_delta")]
    pub max_portfolio_delta: f64,

    /// Penalty per unit of excess delta
    #[serde(default = "default_delta_risk_penalty")]
    pub delta_risk_penalty: f64,

    /// Portfolio gamma magnitude above which the flat penalty applies
    #[serde(default = "default_gamma_limit")]
    pub gamma_limit: f64,

    /// Flat penalty for excess gamma
    #[serde(default = "default_gamma_risk_penalty")]
    pub gamma_risk_penalty: f64,

    /// Drawdown percent of cash balance tolerated before penalizing
    #[serde(default = "default_drawdown_limit_pct")]
    pub drawdown_limit_pct: f64,

    /// Penalty per percent of drawdown beyond the limit
    #[serde(default = "default_drawdown_penalty")]
    pub drawdown_penalty: f64,

    /// Open-position count above which over-trading is penalized
    #[serde(default = "default_position_soft_cap")]
    pub position_soft_cap: u32,

    /// Penalty per position beyond the soft cap
    #[serde(default = "default_overtrade_penalty")]
    pub overtrade_penalty: f64,

    /// Bonus per unit of negative theta carried (premium-selling carry)
    #[serde(default = "default_theta_bonus")]
    pub theta_bonus: f64,

    /// Flat bonus for a hedge that reduces delta magnitude
    #[serde(default = "default_hedge_bonus")]
    pub hedge_bonus: f64,
}

fn default_profit_weight() -> f64 {
    1.0
}
fn default_transaction_cost() -> f64 {
    0.01
}
fn default_max_portfolio_delta() -> f64 {
    100.0
}
fn default_delta_risk_penalty() -> f64 {
    0.5
}
fn default_gamma_limit() -> f64 {
    50.0
}
fn default_gamma_risk_penalty() -> f64 {
    0.25
}
fn default_drawdown_limit_pct() -> f64 {
    5.0
}
fn default_drawdown_penalty() -> f64 {
    2.0
}
fn default_position_soft_cap() -> u32 {
    8
}
fn default_overtrade_penalty() -> f64 {
    0.1
}
fn default_theta_bonus() -> f64 {
    0.01
}
fn default_hedge_bonus() -> f64 {
    1.0
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            profit_weight: default_profit_weight(),
            transaction_cost: default_transaction_cost(),
            max_portfolio_delta: default_max_portfolio_delta(),
            delta_risk_penalty: default_delta_risk_penalty(),
            gamma_limit: default_gamma_limit(),
            gamma_risk_penalty: default_gamma_risk_penalty(),
            drawdown_limit_pct: default_drawdown_limit_pct(),
            drawdown_penalty: default_drawdown_penalty(),
            position_soft_cap: default_position_soft_cap(),
            overtrade_penalty: default_overtrade_penalty(),
            theta_bonus: default_theta_bonus(),
            hedge_bonus: default_hedge_bonus(),
        }
    }
}

/// Structural constraints on which actions are legal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Minimum cash balance required before new buys are offered
    #[serde(default = "default_min_cash")]
    pub min_cash: f64,

    /// Hard cap on open positions before buys are withheld
    #[serde(default = "default_max_open_positions")]
    pub max_open_positions: u32,

    /// Portfolio delta magnitude above which hedges are offered
    #[serde(default = "default_hedge_delta_threshold")]
    pub hedge_delta_threshold: f64,

    /// Fraction scaling the buy size steps (1.0 keeps the raw steps)
    #[serde(default = "default_max_position_frac")]
    pub max_position_frac: f64,
}

fn default_min_cash() -> f64 {
    1_000.0
}
fn default_max_open_positions() -> u32 {
    10
}
fn default_hedge_delta_threshold() -> f64 {
    50.0
}
fn default_max_position_frac() -> f64 {
    1.0
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            min_cash: default_min_cash(),
            max_open_positions: default_max_open_positions(),
            hedge_delta_threshold: default_hedge_delta_threshold(),
            max_position_frac: default_max_position_frac(),
        }
    }
}

impl ActionConfig {
    fn validate(&self) -> Result<()> {
        if !(self.max_position_frac > 0.0 && self.max_position_frac <= 1.0) {
            return Err(Error::Config(format!(
                "max_position_frac must be in (0, 1], got {}",
                self.max_position_frac
            )));
        }
        if self.hedge_delta_threshold < 0.0 {
            return Err(Error::Config(format!(
                "hedge_delta_threshold must be non-negative, got {}",
                self.hedge_delta_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AgentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_learning_rate_rejected() {
        let config = AgentConfig {
            learning_rate: 0.0,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AgentConfig {
            learning_rate: 1.5,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_epsilon_rejected() {
        let config = AgentConfig {
            epsilon: -0.1,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AgentConfig {
            epsilon_decay: 0.0,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_discount_factor_bounds() {
        let config = AgentConfig {
            discount_factor: 1.0,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = AgentConfig {
            discount_factor: 1.01,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_buffer_must_hold_a_batch() {
        let config = AgentConfig {
            batch_size: 64,
            buffer_capacity: 32,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_degenerate_discretizer_rejected() {
        let mut config = AgentConfig::default();
        config.discretizer.vix.bins = 0;
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.discretizer.delta.max = config.discretizer.delta.min;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: AgentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.buffer_capacity, 10_000);
        assert_eq!(config.reward.hedge_bonus, 1.0);
        assert_eq!(config.actions.max_open_positions, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_overrides() {
        let config: AgentConfig =
            serde_json::from_str(r#"{"epsilon": 0.5, "reward": {"hedge_bonus": 2.0}}"#).unwrap();
        assert_eq!(config.epsilon, 0.5);
        assert_eq!(config.reward.hedge_bonus, 2.0);
        // Untouched fields keep defaults
        assert_eq!(config.reward.profit_weight, 1.0);
    }
}
