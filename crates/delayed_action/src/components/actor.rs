//! Владельцы действий: combat unit → persistent запись → фракция

use bevy::prelude::*;

/// Combat-side actor (mech, vehicle) that owns equipment actions
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct CombatUnit {
    /// Linked persistent record (переживает бой; у временных юнитов нет)
    pub persistent: Option<Entity>,
}

impl CombatUnit {
    pub fn linked(persistent: Entity) -> Self {
        Self {
            persistent: Some(persistent),
        }
    }
}

/// Фракция persistent записи
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Faction(pub String);

impl Faction {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}

impl From<&str> for Faction {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
