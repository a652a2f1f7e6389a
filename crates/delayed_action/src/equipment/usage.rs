//! Per-part usage accounting
//!
//! `TurnActivations` — turn-scoped кэш "эта часть уже засчитана в этом ходу".
//! Владеет им turn management (очищает на границе хода через `TurnStarted`),
//! scheduler только читает и добавляет.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::components::{PartId, PartUsage};

/// Parts already counted toward `PartUsage::turns` in the current turn
#[derive(Resource, Debug, Clone, Default)]
pub struct TurnActivations {
    part_ids: HashSet<PartId>,
}

impl TurnActivations {
    pub fn contains(&self, part: PartId) -> bool {
        self.part_ids.contains(&part)
    }

    /// true если часть ещё не была засчитана в этом ходу
    pub fn insert(&mut self, part: PartId) -> bool {
        self.part_ids.insert(part)
    }

    pub fn clear(&mut self) {
        self.part_ids.clear();
    }

    pub fn len(&self) -> usize {
        self.part_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.part_ids.is_empty()
    }
}

impl PartUsage {
    /// Count one expansion of `part`.
    ///
    /// `(turns, activations)` записываются одной парой.
    pub fn record_activation(&mut self, part: PartId, turn: &mut TurnActivations) {
        let mut next = *self;
        next.activations += 1;
        if turn.insert(part) {
            next.turns += 1;
        }
        *self = next;
    }
}
