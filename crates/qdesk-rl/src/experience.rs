//! Experience replay buffer

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use qdesk_core::{RLState, TradeAction};

/// A single transition record (s, a, r, s', done), immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub state: RLState,
    pub action: TradeAction,
    pub reward: f64,
    pub next_state: RLState,
    pub done: bool,
}

impl Experience {
    pub fn new(
        state: RLState,
        action: TradeAction,
        reward: f64,
        next_state: RLState,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }
}

/// Bounded FIFO of transitions with uniform random sampling.
///
/// Insertion beyond capacity evicts the oldest entry. Sampling draws each
/// slot independently, so one batch may contain duplicates (with
/// replacement, deliberately).
pub struct ExperienceBuffer {
    buffer: VecDeque<Experience>,
    capacity: usize,
}

impl ExperienceBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add an experience, evicting the oldest at capacity
    pub fn push(&mut self, experience: Experience) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(experience);
    }

    /// Sample `batch_size` experiences with replacement. An empty buffer
    /// yields an empty batch, not an error.
    pub fn sample(&self, batch_size: usize) -> Vec<Experience> {
        if self.buffer.is_empty() {
            return Vec::new();
        }

        let mut rng = rand::thread_rng();
        (0..batch_size)
            .map(|_| self.buffer[rng.gen_range(0..self.buffer.len())].clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        self.buffer.iter()
    }
}
