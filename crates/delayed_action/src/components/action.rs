//! Activation windows and the sub-attacks they expand into

use bevy::prelude::*;

/// Текущее время боевой симуляции (секунды), продвигается host'ом
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct SimulationTime {
    pub seconds: f32,
}

impl SimulationTime {
    pub fn new(seconds: f32) -> Self {
        Self { seconds }
    }
}

/// In-progress use of an equipment part.
///
/// Expanded into `ScheduledAttack`s by `schedule_equipment_actions` once the
/// simulation time enters `[start_time, start_time + duration)`.
///
/// Инвариант: `completed` выставляется ровно один раз, после этого action
/// больше никогда не разворачивается.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct EquipmentAction {
    /// Часть, которая активируется (может быть уже despawned)
    pub part: Entity,
    /// Combat unit, владеющий действием
    pub owner: Option<Entity>,
    pub start_time: f32,
    pub duration: f32,
    pub completed: bool,
}

impl EquipmentAction {
    pub fn new(part: Entity, start_time: f32, duration: f32) -> Self {
        Self {
            part,
            owner: None,
            start_time,
            duration,
            completed: false,
        }
    }

    pub fn with_owner(mut self, owner: Entity) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn end_time(&self) -> f32 {
        self.start_time + self.duration
    }
}

/// One discrete timed effect produced by expanding an `EquipmentAction`.
///
/// Consumed by targeting/damage systems downstream.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ScheduledAttack {
    /// Absolute simulation time
    pub start_time: f32,
    /// Back-link на исходный EquipmentAction (только lookup)
    pub source: Entity,
    /// 0-based позиция внутри развёртки
    pub index: u32,
    pub is_first: bool,
    pub is_last: bool,
    pub activation_sound: Option<String>,
    /// Доля act_heat на эту sub-attack
    pub heat_change: f32,
}
