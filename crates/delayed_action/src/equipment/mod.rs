//! Equipment actions — expansion of activations into timed sub-attacks
//!
//! # Architecture
//!
//! **Data → Systems flow:**
//! - Host спавнит `EquipmentAction` (окно активации части)
//! - `schedule_equipment_actions` раз в тик разворачивает action, чьё окно
//!   содержит текущее время, в `ScheduledAttack` entities
//! - Targeting/damage системы читают `ScheduledAttack` после `CombatSet::EquipmentActions`
//!
//! **Timing (config-driven):**
//! - `CombatConfig::targeted_action_buffer` обрезает окно с обеих сторон
//! - single-shot: start policy (start / end / middle / percentage)
//! - multi-shot: bias percentage, остальные выстрелы сжимаются в остаток окна
//!
//! **Usage accounting:**
//! - `PartUsage` (activations + turns) только для фракции игрока
//! - `TurnActivations` — turn-scoped set, сбрасывается на `TurnStarted`

use bevy::ecs::schedule::{InternedScheduleLabel, ScheduleLabel};
use bevy::prelude::*;

pub mod error;
pub mod events;
pub mod policy;
pub mod systems;
pub mod timeline;
pub mod usage;
pub mod validation;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod systems_tests;

// Re-exports
pub use error::*;
pub use events::*;
pub use policy::*;
pub use systems::*;
pub use timeline::*;
pub use usage::*;
pub use validation::*;

use crate::pipeline::{CombatPipeline, StageDescriptor};
use crate::settings::{CombatConfig, LoggingSettings};
use crate::components::SimulationTime;

/// Id of the stock equipment action stage this plugin replaces
pub const EQUIPMENT_ACTION_STAGE: &str = "equipment_action";
/// Id of the delayed-attack stage installed in its place
pub const DELAYED_EQUIPMENT_ACTION_STAGE: &str = "delayed_equipment_action";

/// Combat tick phases visible to downstream systems
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CombatSet {
    /// Turn reset + action expansion
    EquipmentActions,
}

/// Equipment action scheduling plugin
///
/// Регистрирует resources (только если host их ещё не вставил), events и
/// системы в `schedule` (default: `FixedUpdate`).
pub struct ActionSchedulerPlugin {
    pub schedule: InternedScheduleLabel,
}

impl ActionSchedulerPlugin {
    pub fn in_schedule(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
        }
    }
}

impl Default for ActionSchedulerPlugin {
    fn default() -> Self {
        Self::in_schedule(FixedUpdate)
    }
}

impl Plugin for ActionSchedulerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationTime>()
            .init_resource::<CombatConfig>()
            .init_resource::<LoggingSettings>()
            .init_resource::<ActionValidator>()
            .init_resource::<TurnActivations>()
            // Events
            .add_event::<ActionExpanded>()
            .add_event::<ActionExpansionSkipped>()
            .add_event::<TurnStarted>()
            // Сначала сброс хода, потом развёртка
            .add_systems(
                self.schedule,
                (reset_turn_activations, schedule_equipment_actions)
                    .chain()
                    .in_set(CombatSet::EquipmentActions),
            );

        // Host описывает свой combat pipeline → встаём на место стандартного stage
        let settings = app.world().resource::<LoggingSettings>().clone();
        if let Some(mut pipeline) = app.world_mut().get_resource_mut::<CombatPipeline>() {
            pipeline.replace(
                EQUIPMENT_ACTION_STAGE,
                StageDescriptor::execute(DELAYED_EQUIPMENT_ACTION_STAGE),
                &settings,
            );
        }
    }
}
