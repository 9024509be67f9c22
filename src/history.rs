//! Trailing record of the wheel's position.
//!
//! The buffer always holds exactly [`POSITION_HISTORY_LEN`] samples, oldest
//! first.  It is pre-filled with the spawn position so a reader never sees a
//! short buffer, and every push evicts the oldest sample.  The oldest sample
//! is the trailing light / camera target.

use crate::constants::POSITION_HISTORY_LEN;
use bevy::prelude::*;
use std::collections::VecDeque;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct PositionHistory {
    samples: VecDeque<Vec2>,
}

impl PositionHistory {
    /// A full buffer where every sample is `spawn`.
    pub fn new(spawn: Vec2) -> Self {
        Self {
            samples: std::iter::repeat(spawn).take(POSITION_HISTORY_LEN).collect(),
        }
    }

    /// Append the newest sample and evict the oldest beyond capacity.
    pub fn push(&mut self, position: Vec2) {
        self.samples.push_back(position);
        while self.samples.len() > POSITION_HISTORY_LEN {
            self.samples.pop_front();
        }
    }

    /// Always `POSITION_HISTORY_LEN`; the buffer is never empty.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Oldest sample; what the trailing light aims at.
    pub fn trailing_target(&self) -> Vec2 {
        self.samples.front().copied().unwrap_or_default()
    }

    pub fn latest(&self) -> Vec2 {
        self.samples.back().copied().unwrap_or_default()
    }

    /// Samples in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.samples.iter().copied()
    }
}
