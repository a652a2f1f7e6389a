//! Settings: diagnostic logging flags + combat config
//!
//! - `LoggingSettings` — грузится из `settings.ron` (нет файла → defaults)
//! - `CombatConfig` — глобальные константы боя (targeted action buffer, фракция игрока)

use bevy::prelude::*;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::logger::log_info;

/// Имя файла настроек рядом с данными мода/симуляции
pub const SETTINGS_FILE: &str = "settings.ron";

bitflags! {
    /// Diagnostic logging categories.
    ///
    /// In RON: `logging: "SYSTEM | ATTACK"`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct LoggingFlag: u8 {
        /// Stage installation into the combat pipeline
        const SYSTEM = 1 << 0;
        /// Per-event timing diagnostics
        const ATTACK = 1 << 1;
        const ALL = Self::SYSTEM.bits() | Self::ATTACK.bits();
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Diagnostic logging settings
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub logging: LoggingFlag,
}

impl LoggingSettings {
    pub fn with_flags(logging: LoggingFlag) -> Self {
        Self { logging }
    }

    /// Все биты `flag` должны быть включены
    pub fn is_logging_enabled(&self, flag: LoggingFlag) -> bool {
        self.logging.contains(flag)
    }

    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Missing or broken file → defaults (logging off), never an error.
    pub fn load_or_default(path: &Path) -> Self {
        let settings = match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log_info(&format!(
                    "No usable settings file, using defaults | path: {} | reason: {}",
                    path.display(),
                    e
                ));
                Self::default()
            }
        };

        if !settings.logging.is_empty() {
            log_info(&format!("Diagnostic logging is on: {:?}", settings.logging));
        }

        settings
    }
}

/// Global combat constants supplied by the host simulation
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Отступ (сек) с обоих концов окна активации
    pub targeted_action_buffer: f32,
    /// Фракция, для которой ведётся учёт использования частей
    pub player_faction: String,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            targeted_action_buffer: 0.1,
            player_faction: "Phantoms".to_string(),
        }
    }
}
