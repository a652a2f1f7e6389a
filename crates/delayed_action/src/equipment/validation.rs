//! Action validation service
//!
//! Host подменяет проверку через `ActionValidator::new(...)` (DI вместо
//! доступа к закрытому base system).

use bevy::prelude::*;

use crate::components::EquipmentAction;

pub trait ActionValidation: Send + Sync {
    fn is_valid(&self, action: &EquipmentAction) -> bool;
}

impl<F> ActionValidation for F
where
    F: Fn(&EquipmentAction) -> bool + Send + Sync,
{
    fn is_valid(&self, action: &EquipmentAction) -> bool {
        self(action)
    }
}

/// Default check: finite window with positive duration
pub struct WindowValidation;

impl ActionValidation for WindowValidation {
    fn is_valid(&self, action: &EquipmentAction) -> bool {
        action.start_time.is_finite() && action.duration.is_finite() && action.duration > 0.0
    }
}

#[derive(Resource)]
pub struct ActionValidator(Box<dyn ActionValidation>);

impl ActionValidator {
    pub fn new(validation: impl ActionValidation + 'static) -> Self {
        Self(Box::new(validation))
    }

    pub fn is_valid(&self, action: &EquipmentAction) -> bool {
        self.0.is_valid(action)
    }
}

impl Default for ActionValidator {
    fn default() -> Self {
        Self::new(WindowValidation)
    }
}
