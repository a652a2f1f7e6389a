//! Equipment action events
//!
//! - `ActionExpanded` — action развёрнут в sub-attacks (`ScheduledAttack` появятся
//!   после apply commands текущего прохода)
//! - `ActionExpansionSkipped` — action закрыт без sub-attacks (misconfiguration)
//! - `TurnStarted` — граница хода от turn management → сброс `TurnActivations`

use bevy::prelude::*;

use crate::components::PartId;
use crate::equipment::error::ExpansionSkip;

#[derive(Event, Clone, Debug)]
pub struct ActionExpanded {
    pub action: Entity,
    pub part: PartId,
    pub count: u32,
}

#[derive(Event, Clone, Debug)]
pub struct ActionExpansionSkipped {
    pub action: Entity,
    pub reason: ExpansionSkip,
}

#[derive(Event, Clone, Copy, Debug, Default)]
pub struct TurnStarted;
