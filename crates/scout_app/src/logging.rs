//! Maps the `--log-to` flag and config onto the shared logger setup.

use std::path::PathBuf;

use scout_logging::{parse_level, LogDestination, LogSettings};

use crate::config::ScoutConfig;

/// Destination for log output, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogTarget {
    File,
    /// Stderr, so command output on stdout stays clean.
    Terminal,
    Both,
    Off,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
            LogTarget::Off => LogDestination::Off,
        }
    }
}

pub fn settings(target: LogTarget, config: &ScoutConfig) -> LogSettings {
    LogSettings {
        destination: target.into(),
        level: parse_level(&config.log_level),
        file: PathBuf::from(&config.log_file),
    }
}

pub fn initialize(target: LogTarget, config: &ScoutConfig) {
    scout_logging::initialize(&settings(target, config));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn settings_follow_flag_and_config() {
        let config = ScoutConfig {
            log_level: "debug".to_string(),
            log_file: "logs/scout-debug.log".to_string(),
            ..ScoutConfig::default()
        };
        assert_eq!(
            settings(LogTarget::Both, &config),
            LogSettings {
                destination: LogDestination::Both,
                level: scout_logging::log::LevelFilter::Debug,
                file: PathBuf::from("logs/scout-debug.log"),
            }
        );
        assert_eq!(
            settings(LogTarget::Off, &ScoutConfig::default()).file,
            PathBuf::from(scout_logging::DEFAULT_LOG_FILE)
        );
    }
}
