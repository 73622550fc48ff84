//! Planner configuration.
//!
//! Read from a TOML file; every key is optional and unknown keys are
//! rejected.
//!
//! ```toml
//! database_path = "/home/me/.planner/planner.sqlite3"
//! log_level = "info"
//! log_dir = "/home/me/.planner/logs"
//! default_lead_minutes = 15
//! ```

use crate::logging::default_log_level;
use chrono::Duration;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_FILE: &str = "planner.sqlite3";
pub const DEFAULT_LEAD_MINUTES: i64 = 10;

/// Runtime settings shared by the core and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub default_lead_minutes: i64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_lead_minutes: DEFAULT_LEAD_MINUTES,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl PlannerConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Lead time applied when a reminder is requested without one.
    pub fn default_lead_time(&self) -> Duration {
        Duration::minutes(self.default_lead_minutes)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path must not be empty".to_string(),
            ));
        }
        if self.default_lead_minutes < 0 {
            return Err(ConfigError::Invalid(format!(
                "default_lead_minutes must not be negative, got {}",
                self.default_lead_minutes
            )));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PlannerConfig, DEFAULT_LEAD_MINUTES};
    use chrono::Duration;
    use std::path::PathBuf;

    #[test]
    fn empty_text_yields_defaults() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.default_lead_minutes, DEFAULT_LEAD_MINUTES);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = PlannerConfig::from_toml_str(
            r#"
            database_path = "/tmp/plans.sqlite3"
            log_level = "warn"
            default_lead_minutes = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/plans.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.default_lead_time(), Duration::minutes(30));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PlannerConfig::from_toml_str("weather_api_key = \"abc\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = PlannerConfig::from_toml_str("log_dir = \"logs\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
