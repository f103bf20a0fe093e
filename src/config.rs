use std::path::PathBuf;

use thiserror::Error;
use tracing::Level;

use crate::input::InputFormat;
use crate::present::OutputFormat;
use crate::search::SearchConfig;

/// Hard ceiling for `max_guests`; 15! arrangements is already out of reach.
pub const MAX_GUESTS_CEILING: usize = 14;

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input: PathBuf,
    /// `None` picks the format from the file extension.
    pub input_format: Option<InputFormat>,
    pub output: OutputFormat,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn new(input: impl Into<PathBuf>) -> Config {
        Config {
            input: input.into(),
            input_format: None,
            output: OutputFormat::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.search.max_guests == 0 || self.search.max_guests > MAX_GUESTS_CEILING {
            return Err(ConfigError::InvalidField {
                field: "max_guests".into(),
                message: format!("must be between 1 and {MAX_GUESTS_CEILING}"),
            });
        }
        if self.search.max_winners == Some(0) {
            return Err(ConfigError::InvalidField {
                field: "max_winners".into(),
                message: "must keep at least one arrangement".into(),
            });
        }
        if self.search.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConfigError::InvalidField {
                field: "timeout".into(),
                message: "must be greater than zero".into(),
            });
        }
        self.logging.normalize();
        if self.logging.level().is_none() {
            return Err(ConfigError::InvalidField {
                field: "log_level".into(),
                message: format!("unknown level `{}`", self.logging.tracing_level),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub tracing_level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            tracing_level: default_tracing_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let mut config = Config::new("row.txt");
        config.validate().unwrap();
        assert_eq!(config.logging.level(), Some(Level::WARN));
        assert_eq!(config.search.max_guests, crate::search::DEFAULT_MAX_GUESTS);
    }

    #[test]
    fn rejects_out_of_range_guest_limit() {
        let mut config = Config::new("row.txt");
        config.search.max_guests = MAX_GUESTS_CEILING + 1;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { ref field, .. } if field == "max_guests"));

        config.search.max_guests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_winner_cap() {
        let mut config = Config::new("row.txt");
        config.search.max_winners = Some(0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { ref field, .. } if field == "max_winners"));
        config.search.max_winners = Some(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = Config::new("row.txt");
        config.search.timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());
        config.search.timeout = Some(Duration::from_millis(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_level_falls_back_and_unknown_level_fails() {
        let mut config = Config::new("row.txt");
        config.logging.tracing_level = "  ".into();
        config.validate().unwrap();
        assert_eq!(config.logging.tracing_level, "warn");

        config.logging.tracing_level = "Debug".into();
        config.validate().unwrap();
        assert_eq!(config.logging.level(), Some(Level::DEBUG));

        config.logging.tracing_level = "loud".into();
        assert!(config.validate().is_err());
    }
}
