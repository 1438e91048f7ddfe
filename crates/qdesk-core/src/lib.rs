//! Qdesk Core - Shared types for the portfolio decision agent
//!
//! This crate provides the vocabulary exchanged between the portfolio layer
//! (which observes positions and market data) and the RL decision core.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ActionKind, RLState, TradeAction};
