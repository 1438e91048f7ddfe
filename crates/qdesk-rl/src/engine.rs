//! Q-learning agent - epsilon-greedy policy plus TD(0) training with replay

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use qdesk_core::{Result, RLState, TradeAction};

use crate::action::{legal_actions, ActionKey};
use crate::config::AgentConfig;
use crate::experience::{Experience, ExperienceBuffer};
use crate::qtable::QTable;
use crate::reward;

/// Tabular Q-learning agent over discretized portfolio states.
///
/// Explicitly constructed with caller-controlled lifetime; all mutable
/// state (Q-table, replay buffer, epsilon) lives inside the instance. The
/// core is single-threaded and synchronous: embedders must serialize
/// mutating calls (`learn`, `import_model`) behind one writer.
pub struct QAgent {
    pub(crate) config: AgentConfig,
    pub(crate) q_table: QTable,
    pub(crate) buffer: ExperienceBuffer,
    pub(crate) epsilon: f64,
    total_steps: u64,
    total_rewards: f64,
}

impl QAgent {
    /// Create an agent from validated configuration
    pub fn new(config: AgentConfig) -> Result<Self> {
        config.validate()?;

        info!(
            alpha = config.learning_rate,
            gamma = config.discount_factor,
            epsilon = config.epsilon,
            batch_size = config.batch_size,
            "Q-learning agent initialized"
        );

        let buffer = ExperienceBuffer::new(config.buffer_capacity);
        let epsilon = config.epsilon;
        Ok(Self {
            config,
            q_table: QTable::new(),
            buffer,
            epsilon,
            total_steps: 0,
            total_rewards: 0.0,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Select an action for the given state.
    ///
    /// With `explore` set, a uniform draw below epsilon picks a random legal
    /// action (training rollouts); otherwise selection is greedy over the
    /// legal set, with untried actions valued 0 and ties broken by the
    /// canonical enumeration order. A state with no table row at all
    /// returns `hold`.
    pub fn select_action(&self, state: &RLState, explore: bool) -> TradeAction {
        let candidates = legal_actions(state, &self.config.actions);

        if explore {
            let mut rng = rand::thread_rng();
            if rng.gen::<f64>() < self.epsilon {
                return candidates
                    .choose(&mut rng)
                    .cloned()
                    .unwrap_or_else(TradeAction::hold);
            }
        }

        self.greedy_action(state, &candidates)
    }

    /// Greedy argmax over the legal set; first strict maximum wins so the
    /// result does not depend on map iteration order.
    pub(crate) fn greedy_action(&self, state: &RLState, candidates: &[TradeAction]) -> TradeAction {
        let state_key = self.config.discretizer.discretize(state);
        let Some(row) = self.q_table.row(&state_key) else {
            return TradeAction::hold();
        };

        let mut best: Option<(&TradeAction, f64)> = None;
        for action in candidates {
            let key = ActionKey::from_action(action);
            let value = row.get(&key).map_or(0.0, |q| q.value);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }

        best.map_or_else(TradeAction::hold, |(action, _)| action.clone())
    }

    /// Learn from one executed transition.
    ///
    /// Shapes the reward, stores the experience, applies an immediate TD(0)
    /// update, replays a sampled batch once the buffer holds at least
    /// `batch_size` entries, and decays epsilon toward its floor. Returns
    /// the shaped reward.
    pub fn learn(
        &mut self,
        state: &RLState,
        action: &TradeAction,
        next_state: &RLState,
        done: bool,
    ) -> f64 {
        let shaped = reward::shape(&self.config.reward, state, action, next_state);

        let experience = Experience::new(
            state.clone(),
            action.clone(),
            shaped,
            next_state.clone(),
            done,
        );
        self.buffer.push(experience.clone());

        // Always one online update, replay only once the buffer warms up
        self.td_update(&experience);
        if self.buffer.len() >= self.config.batch_size {
            let batch = self.buffer.sample(self.config.batch_size);
            for sampled in &batch {
                self.td_update(sampled);
            }
            debug!(batch = batch.len(), "replayed experience batch");
        }

        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        self.total_steps += 1;
        self.total_rewards += shaped;

        debug!(
            reward = shaped,
            epsilon = self.epsilon,
            states = self.q_table.len(),
            "learned from transition"
        );

        shaped
    }

    /// Single TD(0) update: value += alpha * (r + gamma * maxNext - value)
    fn td_update(&mut self, experience: &Experience) {
        let state_key = self.config.discretizer.discretize(&experience.state);
        let action_key = ActionKey::from_action(&experience.action);

        let max_next = if experience.done {
            0.0
        } else {
            let next_key = self.config.discretizer.discretize(&experience.next_state);
            self.q_table.max_value(&next_key)
        };

        let target = experience.reward + self.config.discount_factor * max_next;
        let alpha = self.config.learning_rate;

        let cell = self.q_table.entry(state_key, action_key);
        cell.value += alpha * (target - cell.value);
        cell.visits += 1;
    }

    /// Drop buffered experiences (the learned table is untouched)
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Running statistics
    pub fn stats(&self) -> AgentStats {
        AgentStats {
            total_steps: self.total_steps,
            total_rewards: self.total_rewards,
            average_reward: if self.total_steps > 0 {
                self.total_rewards / self.total_steps as f64
            } else {
                0.0
            },
            buffer_size: self.buffer.len(),
            states_seen: self.q_table.len(),
            epsilon: self.epsilon,
        }
    }
}

/// Agent statistics
#[derive(Debug, Clone, Serialize)]
pub struct AgentStats {
    pub total_steps: u64,
    pub total_rewards: f64,
    pub average_reward: f64,
    pub buffer_size: usize,
    pub states_seen: usize,
    pub epsilon: f64,
}
