//! Custom timing policy of an activation subsystem
//!
//! Author-supplied custom data приходит как нетипизированный bag
//! (`floats` / `strings`). Парсим его ОДИН раз при загрузке данных в typed
//! `TimingPolicy`, чтобы scheduler не разбирал map'ы каждый тик.
//!
//! Ключ `action_start_time`:
//! - string: `"start"` | `"end"` | `"middle"` | `"percentage"` (single-shot start policy)
//! - float: доля окна `[0, 1]` (percentage для single-shot, bias для multi-shot)
//!
//! Любое отсутствующее/кривое значение деградирует к default, никогда не ошибка.

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::components::ActivationProcessed;

/// Custom data key shared by the string and float tables
pub const ACTION_START_TIME_KEY: &str = "action_start_time";

/// Raw custom data bag of a subsystem
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartCustom {
    #[serde(deserialize_with = "lenient_table")]
    pub floats: Option<HashMap<String, f32>>,
    #[serde(deserialize_with = "lenient_table")]
    pub strings: Option<HashMap<String, String>>,
}

/// Кривые записи выкидываются, кривая таблица целиком → `None`.
/// Остальная definition (audio) при этом грузится.
fn lenient_table<'de, D, T>(deserializer: D) -> Result<Option<HashMap<String, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry<T> {
        Valid(T),
        Invalid(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Table<T> {
        Valid(Option<HashMap<String, Entry<T>>>),
        Invalid(IgnoredAny),
    }

    let table = match Table::<T>::deserialize(deserializer)? {
        Table::Valid(table) => table,
        Table::Invalid(_) => None,
    };

    Ok(table.map(|entries| {
        entries
            .into_iter()
            .filter_map(|(key, entry)| match entry {
                Entry::Valid(value) => Some((key, value)),
                Entry::Invalid(_) => None,
            })
            .collect()
    }))
}

impl PartCustom {
    pub fn float(&self, key: &str) -> Option<f32> {
        self.floats.as_ref()?.get(key).copied()
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.strings.as_ref()?.get(key).map(String::as_str)
    }
}

/// Data-load form of a subsystem (RON)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemDefinition {
    pub activation_processed: Option<ActivationProcessed>,
    pub custom: Option<PartCustom>,
}

impl SubsystemDefinition {
    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }
}

/// Where the sole sub-attack of a single-shot activation lands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartPolicy {
    #[default]
    Start,
    End,
    Middle,
    Percentage,
}

impl StartPolicy {
    /// Неизвестное слово → Start
    pub fn parse(keyword: &str) -> Self {
        match keyword {
            "end" => StartPolicy::End,
            "middle" => StartPolicy::Middle,
            "percentage" => StartPolicy::Percentage,
            _ => StartPolicy::Start,
        }
    }
}

/// Typed timing policy of an activation subsystem
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimingPolicy {
    pub start: StartPolicy,
    /// Always within `[0, 1]`
    pub percentage: f32,
}

impl TimingPolicy {
    pub fn from_custom(custom: Option<&PartCustom>) -> Self {
        let Some(custom) = custom else {
            return Self::default();
        };

        Self {
            start: custom
                .string(ACTION_START_TIME_KEY)
                .map(StartPolicy::parse)
                .unwrap_or_default(),
            percentage: clamp_percentage(custom.float(ACTION_START_TIME_KEY)),
        }
    }

    pub fn end() -> Self {
        Self {
            start: StartPolicy::End,
            percentage: 0.0,
        }
    }

    pub fn middle() -> Self {
        Self {
            start: StartPolicy::Middle,
            percentage: 0.0,
        }
    }

    pub fn percentage(value: f32) -> Self {
        Self {
            start: StartPolicy::Percentage,
            percentage: clamp_percentage(Some(value)),
        }
    }

    /// Multi-shot bias без изменения single-shot policy
    pub fn with_bias(mut self, value: f32) -> Self {
        self.percentage = clamp_percentage(Some(value));
        self
    }

    /// Offset of a single-shot start from the buffered window start
    pub fn single_shot_offset(&self, spacing: f32) -> f32 {
        match self.start {
            StartPolicy::Start => 0.0,
            StartPolicy::End => spacing,
            StartPolicy::Middle => spacing / 2.0,
            StartPolicy::Percentage => spacing * self.percentage,
        }
    }
}

/// Out of `[0, 1]`, NaN or missing → 0 (misconfigured subsystem, стандартное поведение)
pub fn clamp_percentage(value: Option<f32>) -> f32 {
    match value {
        Some(pct) if (0.0..=1.0).contains(&pct) => pct,
        _ => 0.0,
    }
}
