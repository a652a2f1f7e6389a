//! Simulation logger
//!
//! Глобальный `LogPrinter` (host может подменить на свой — Godot, файл, тесты).
//! Категории диагностики (SYSTEM / ATTACK) фильтруются на стороне вызова
//! через `LoggingSettings::is_logging_enabled`, здесь только уровни.

use once_cell::sync::Lazy;
use std::sync::{Mutex, MutexGuard};

static LOGGER: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));

pub static LOGGER_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

// Отравленный mutex не должен ронять симуляцию — логирование чисто наблюдательное
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn set_logger(logger: Box<dyn LogPrinter>) {
    *lock(&LOGGER) = Some(logger);
}

pub fn set_log_level(level: LogLevel) {
    *lock(&LOGGER_LEVEL) = level;
}

pub fn set_logger_if_needed(logger: Box<dyn LogPrinter>) {
    let mut slot = lock(&LOGGER);
    if slot.is_none() {
        *slot = Some(logger);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_int().cmp(&other.as_int())
    }
}

impl PartialEq for LogLevel {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for LogLevel {}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn as_int(&self) -> i32 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warning => 2,
            LogLevel::Error => 3,
        }
    }
}

pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    if level < *lock(&LOGGER_LEVEL) {
        return;
    }

    // timestamp добавляем здесь, а не в конкретном printer'е
    if let Some(logger) = lock(&LOGGER).as_ref() {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        logger.log(level, &format!("[{}] {}", timestamp, message));
    }
}

pub struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

pub fn init_logger() {
    set_logger_if_needed(Box::new(ConsoleLogger));
}

/// Общий recording printer для тестов: ставится один раз на процесс,
/// тесты фильтруют строки по своим уникальным маркерам.
#[cfg(test)]
pub(crate) fn captured_logs() -> std::sync::Arc<Mutex<Vec<String>>> {
    use std::sync::Arc;

    struct RecordingLogger {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl LogPrinter for RecordingLogger {
        fn log(&self, level: LogLevel, message: &str) {
            lock(&self.lines).push(format!("{} {}", level.as_str(), message));
        }
    }

    static CAPTURED: Lazy<Arc<Mutex<Vec<String>>>> = Lazy::new(|| {
        let lines = Arc::new(Mutex::new(Vec::new()));
        set_logger(Box::new(RecordingLogger { lines: lines.clone() }));
        lines
    });

    CAPTURED.clone()
}

#[cfg(test)]
pub(crate) fn captured_lines_with(marker: &str) -> Vec<String> {
    lock(&captured_logs())
        .iter()
        .filter(|line| line.contains(marker))
        .cloned()
        .collect()
}
