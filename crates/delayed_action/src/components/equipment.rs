//! Equipment components
//!
//! # Архитектура
//!
//! **EquipmentPart** — активируемая часть (оружие, пусковая установка):
//! - `id` — stable `PartId` (ключ для per-turn учёта)
//! - `primary_subsystem` — подсистема, описывающая активацию (звук, timing)
//! - Required: `PartStats` (кэш статов) + `PartUsage` (счётчики использования)
//!
//! **Subsystem** — данные активации:
//! - `activation` — processed activation data (audio hooks); без неё часть считается
//!   misconfigured и ничего не делает
//! - `timing` — typed `TimingPolicy`, распарсенная один раз при загрузке данных

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::equipment::policy::{SubsystemDefinition, TimingPolicy};

/// Stat: количество sub-attacks за активацию (continuous, округляется)
pub const STAT_ACT_COUNT: &str = "act_count";
/// Stat: суммарный нагрев за активацию
pub const STAT_ACT_HEAT: &str = "act_heat";

/// Stable part identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub struct PartId(pub u32);

/// Equipment part that can be activated
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(PartStats, PartUsage)]
pub struct EquipmentPart {
    pub id: PartId,
    pub primary_subsystem: Option<Entity>,
}

impl EquipmentPart {
    pub fn new(id: PartId) -> Self {
        Self {
            id,
            primary_subsystem: None,
        }
    }

    pub fn with_subsystem(mut self, subsystem: Entity) -> Self {
        self.primary_subsystem = Some(subsystem);
        self
    }
}

/// Cached stat table of a part (host stat service result)
#[derive(Component, Debug, Clone, Default)]
pub struct PartStats {
    stats: HashMap<String, f32>,
}

impl PartStats {
    pub fn with(mut self, name: &str, value: f32) -> Self {
        self.stats.insert(name.to_string(), value);
        self
    }

    pub fn set(&mut self, name: &str, value: f32) {
        self.stats.insert(name.to_string(), value);
    }

    /// Missing stat → 0.0
    pub fn cached_stat(&self, name: &str) -> f32 {
        self.stats.get(name).copied().unwrap_or(0.0)
    }
}

/// Cumulative usage counters of a part.
///
/// - `activations` — каждая развёртка
/// - `turns` — не больше +1 за ход, сколько бы активаций ни было
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct PartUsage {
    pub turns: u32,
    pub activations: u32,
}

/// Audio hooks for the first/middle/last sub-attack
#[derive(Debug, Clone, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationAudio {
    pub on_first: Option<String>,
    pub on_mid: Option<String>,
    pub on_last: Option<String>,
}

impl ActivationAudio {
    /// Пустая строка == нет звука
    pub fn first(&self) -> Option<&str> {
        non_empty(&self.on_first)
    }

    pub fn mid(&self) -> Option<&str> {
        non_empty(&self.on_mid)
    }

    pub fn last(&self) -> Option<&str> {
        non_empty(&self.on_last)
    }
}

fn non_empty(sound: &Option<String>) -> Option<&str> {
    sound.as_deref().filter(|s| !s.is_empty())
}

/// Processed activation data of a subsystem
#[derive(Debug, Clone, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationProcessed {
    pub audio: Option<ActivationAudio>,
}

/// Activation subsystem attached to a part
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Subsystem {
    pub activation: Option<ActivationProcessed>,
    pub timing: TimingPolicy,
}

impl From<SubsystemDefinition> for Subsystem {
    fn from(definition: SubsystemDefinition) -> Self {
        Self {
            timing: TimingPolicy::from_custom(definition.custom.as_ref()),
            activation: definition.activation_processed,
        }
    }
}
