//! Why an activation produced no sub-attacks

use bevy::prelude::*;
use thiserror::Error;

use crate::components::PartId;

/// Abort reason of one expansion.
///
/// Ни одна причина не фатальна: action остаётся `completed`, тик продолжается.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpansionSkip {
    #[error("equipment part {0:?} not found")]
    PartMissing(Entity),

    #[error("invalid equipment action")]
    InvalidAction,

    #[error("part {0:?} has no primary activation subsystem")]
    NoPrimarySubsystem(PartId),

    #[error("subsystem {0:?} has no processed activation data")]
    NoActivationData(Entity),

    #[error("part {part:?} has action count at {count}, no actions would be performed")]
    NoActions { part: PartId, count: i32 },

    #[error("equipment action has no owner")]
    NoOwner,
}

impl ExpansionSkip {
    /// Invalid domain state → warning; dangling references → тихо
    pub fn is_warning(&self) -> bool {
        matches!(self, ExpansionSkip::InvalidAction | ExpansionSkip::NoActions { .. })
    }
}
