#![deny(missing_docs)]
//! Shared logging utilities for the scout workspace.
//!
//! This crate provides the `scout_*` logging macros used across the codebase,
//! the global logger setup for binaries, and a minimal test initializer. The
//! macros expand to the `log` facade re-exported from here, so callers do not
//! need their own `log` dependency.

use std::fs::File;
use std::path::PathBuf;

use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[doc(hidden)]
pub use log;

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "scout.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// The log file only.
    #[default]
    File,
    /// Stderr, so command output on stdout stays clean.
    Terminal,
    /// Stderr and the log file.
    Both,
    /// No logger is installed.
    Off,
}

impl LogDestination {
    fn to_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }

    fn to_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }
}

/// Everything needed to install the global logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Where output goes.
    pub destination: LogDestination,
    /// Most verbose level that is written.
    pub level: log::LevelFilter,
    /// Truncated on startup.
    pub file: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            destination: LogDestination::default(),
            level: log::LevelFilter::Info,
            file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Installs the global logger. Repeated calls are ignored.
///
/// A log file that cannot be created is reported on stderr and skipped.
pub fn initialize(settings: &LogSettings) {
    let loggers = build_loggers(settings);
    if loggers.is_empty() {
        return;
    }
    let _ = CombinedLogger::init(loggers);
}

/// Builds the loggers `settings` asks for without installing them.
pub fn build_loggers(settings: &LogSettings) -> Vec<Box<dyn SharedLogger>> {
    let config = build_config();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if settings.destination.to_terminal() {
        loggers.push(TermLogger::new(
            settings.level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if settings.destination.to_file() {
        match File::create(&settings.file) {
            Ok(file) => loggers.push(WriteLogger::new(settings.level, config, file)),
            Err(err) => eprintln!(
                "Warning: Could not create log file at {:?}: {}",
                settings.file, err
            ),
        }
    }
    loggers
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(log::LevelFilter::Error)
        .build()
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! scout_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! scout_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! scout_info {
    ($($arg:tt)*) => {{
        $crate::log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! scout_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! scout_error {
    ($($arg:tt)*) => {{
        $crate::log::error!($($arg)*);
    }};
}

/// Parses a level name such as `"debug"` or `"WARN"`.
///
/// Unknown names fall back to `Info`.
pub fn parse_level(name: &str) -> log::LevelFilter {
    name.trim().parse().unwrap_or(log::LevelFilter::Info)
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log, Record};

    #[test]
    fn parse_level_accepts_any_case_and_falls_back() {
        assert_eq!(parse_level("debug"), log::LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), log::LevelFilter::Warn);
        assert_eq!(parse_level("chatty"), log::LevelFilter::Info);
    }

    #[test]
    fn destination_selects_loggers() {
        let dir = tempfile::tempdir().unwrap();
        let settings = |destination| LogSettings {
            destination,
            file: dir.path().join(DEFAULT_LOG_FILE),
            ..LogSettings::default()
        };
        assert_eq!(build_loggers(&settings(LogDestination::Off)).len(), 0);
        assert_eq!(build_loggers(&settings(LogDestination::Terminal)).len(), 1);
        assert_eq!(build_loggers(&settings(LogDestination::File)).len(), 1);
        assert_eq!(build_loggers(&settings(LogDestination::Both)).len(), 2);
    }

    #[test]
    fn unwritable_log_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LogSettings {
            destination: LogDestination::Both,
            file: dir.path().join("missing").join(DEFAULT_LOG_FILE),
            ..LogSettings::default()
        };
        // The terminal logger survives on its own.
        assert_eq!(build_loggers(&settings).len(), 1);
    }

    #[test]
    fn file_logger_respects_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_LOG_FILE);
        let settings = LogSettings {
            destination: LogDestination::File,
            level: log::LevelFilter::Info,
            file: path.clone(),
        };
        let loggers = build_loggers(&settings);
        let logger = &loggers[0];
        logger.log(
            &Record::builder()
                .args(format_args!("poll started for {}", "coffee"))
                .level(Level::Info)
                .target("scout_engine")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("tick {}", 7))
                .level(Level::Debug)
                .target("scout_engine")
                .build(),
        );
        logger.flush();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("poll started for coffee"));
        assert!(!written.contains("tick 7"));
    }
}
