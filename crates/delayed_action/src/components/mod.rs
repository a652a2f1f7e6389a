//! ECS Components для combat entity
//!
//! Организация по доменам:
//! - action: окно активации (EquipmentAction), результат (ScheduledAttack), время симуляции
//! - equipment: части и подсистемы (EquipmentPart, PartStats, PartUsage, Subsystem)
//! - actor: владелец действия (CombatUnit) и его persistent запись (Faction)

pub mod action;
pub mod actor;
pub mod equipment;

// Re-exports для удобного импорта
pub use action::*;
pub use actor::*;
pub use equipment::*;
