//! DELAYED ACTION simulation core
//!
//! ECS-симуляция на Bevy 0.16: развёртка активаций экипировки в
//! последовательность timed sub-attacks.
//!
//! - `components` — данные world (actions, parts, subsystems, owners)
//! - `equipment` — scheduler + timing policy + usage accounting
//! - `pipeline` — описание порядка combat stages для host'а
//! - `settings` — logging flags (`settings.ron`) + combat config
//! - `logger` — глобальный LogPrinter

use bevy::prelude::*;
use std::path::Path;

// Публичные модули
pub mod components;
pub mod equipment;
pub mod logger;
pub mod pipeline;
pub mod settings;

// Re-export базовых типов для удобства
pub use components::*;
pub use equipment::{
    ActionExpanded, ActionExpansionSkipped, ActionSchedulerPlugin, ActionTimeline, ActionValidation,
    ActionValidator, CombatSet, ExpansionSkip, SubsystemDefinition, TimingPolicy, TurnActivations,
    TurnStarted,
};
pub use logger::*;
pub use pipeline::{CombatPipeline, StageDescriptor, StageKind};
pub use settings::{CombatConfig, LoggingFlag, LoggingSettings, SETTINGS_FILE};

/// Главный plugin симуляции
///
/// Грузит `settings.ron` (если host ещё не вставил `LoggingSettings`) и
/// подключает scheduler в FixedUpdate.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<LoggingSettings>() {
            app.insert_resource(LoggingSettings::load_or_default(Path::new(SETTINGS_FILE)));
        }

        app.add_plugins(ActionSchedulerPlugin::default());
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins);

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
