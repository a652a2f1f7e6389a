//! Combat pipeline description
//!
//! Упорядоченный список stage descriptors (kind + id) per-tick combat systems.
//! Host держит его как resource; плагины встают перед/вместо stage по id,
//! без доступа к приватным полям закрытого pipeline.
//!
//! - `insert_before` — первый match того же kind; нет match → append
//! - `replace` — первый match того же kind; нет match → append
//! - оба возвращают, был ли match

use bevy::prelude::*;

use crate::{
    log, log_warning,
    settings::{LoggingFlag, LoggingSettings},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Initialize,
    Execute,
    Cleanup,
    TearDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDescriptor {
    pub kind: StageKind,
    pub id: String,
}

impl StageDescriptor {
    pub fn new(kind: StageKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn execute(id: impl Into<String>) -> Self {
        Self::new(StageKind::Execute, id)
    }

    fn matches(&self, kind: StageKind, id: &str) -> bool {
        self.kind == kind && self.id == id
    }
}

/// Ordered per-tick combat stages.
///
/// Только описание: host читает список, когда строит свой schedule.
/// Реальный порядок систем этого crate задаёт `CombatSet`, splice его не меняет.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatPipeline {
    stages: Vec<StageDescriptor>,
}

impl CombatPipeline {
    pub fn new(stages: Vec<StageDescriptor>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    pub fn position(&self, kind: StageKind, id: &str) -> Option<usize> {
        self.stages.iter().position(|stage| stage.matches(kind, id))
    }

    pub fn install_at_end(&mut self, stage: StageDescriptor, settings: &LoggingSettings) {
        if settings.is_logging_enabled(LoggingFlag::SYSTEM) {
            log(&format!("installed stage {} ({:?})", stage.id, stage.kind));
        }
        self.stages.push(stage);
    }

    /// Insert `stage` before the first stage `target` of the same kind.
    pub fn insert_before(&mut self, target: &str, stage: StageDescriptor, settings: &LoggingSettings) -> bool {
        let found = self.position(stage.kind, target);

        if settings.is_logging_enabled(LoggingFlag::SYSTEM) {
            match found {
                Some(_) => log(&format!(
                    "inserted stage {} ({:?}) before {}",
                    stage.id, stage.kind, target
                )),
                None => log(&format!(
                    "did not find stage {} so appended stage {} ({:?})",
                    target, stage.id, stage.kind
                )),
            }
        }

        match found {
            Some(index) => self.stages.insert(index, stage),
            None => self.stages.push(stage),
        }

        found.is_some()
    }

    /// Replace the first stage `target` of the same kind with `stage`.
    pub fn replace(&mut self, target: &str, stage: StageDescriptor, settings: &LoggingSettings) -> bool {
        let Some(index) = self.position(stage.kind, target) else {
            log_warning(&format!(
                "unable to replace stage {} ({:?}), appended {} instead",
                target, stage.kind, stage.id
            ));
            self.stages.push(stage);
            return false;
        };

        if settings.is_logging_enabled(LoggingFlag::SYSTEM) {
            log(&format!(
                "replaced stage {} ({:?}) with {}",
                target, stage.kind, stage.id
            ));
        }
        self.stages[index] = stage;

        true
    }
}
