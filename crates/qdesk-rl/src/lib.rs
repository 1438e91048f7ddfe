//! Qdesk RL - Tabular Q-learning decision agent for portfolio actions
//!
//! This crate provides the decision-making core of the trading desk: an
//! epsilon-greedy policy over a sparse Q-table, TD(0) training with
//! experience replay, reward shaping for options-portfolio transitions,
//! and versioned snapshot export/import for persistence.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]

pub mod action;
pub mod config;
pub mod engine;
pub mod experience;
pub mod qtable;
pub mod recommend;
pub mod reward;
pub mod snapshot;
pub mod state;

pub use action::{legal_actions, ActionKey};
pub use config::{ActionConfig, AgentConfig, RewardConfig};
pub use engine::{AgentStats, QAgent};
pub use experience::{Experience, ExperienceBuffer};
pub use qtable::{QTable, QValue};
pub use recommend::Recommendation;
pub use snapshot::ModelSnapshot;
pub use state::{Discretizer, StateKey};

pub use qdesk_core::{ActionKind, RLState, TradeAction};
