//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/themeparks/config.toml` by default:
//!
//! ```toml
//! [settings]
//! cache_wait_times_secs = 300
//! schedule_days = 14
//! default_timezone = "America/New_York"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use themeparks_core::{TracingConfig, TracingOutputFormat};
use themeparks_parks::Settings;

use crate::error::{CliError, CliResult};

/// Configuration for the themeparks CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Cache and schedule settings passed to every park.
    pub settings: Settings,

    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level name (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,

    pub format: TracingOutputFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: TracingOutputFormat::Compact,
        }
    }
}

impl LoggingSettings {
    /// Builds the tracing configuration. `--debug` wins over the file.
    pub fn tracing_config(&self, debug: bool) -> CliResult<TracingConfig> {
        if debug {
            return Ok(TracingConfig::cli_debug());
        }
        Ok(TracingConfig::default()
            .with_level_name(&self.level)?
            .with_format(self.format))
    }
}

impl CliConfig {
    /// Loads configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read config {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse config: {}", e)))
    }

    /// Checks every section is usable.
    pub fn validate(&self) -> CliResult<()> {
        self.settings.validate()?;
        self.logging.tracing_config(false)?;
        Ok(())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("themeparks")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: CliConfig = toml::from_str(
            r#"
[settings]
schedule_days = 14
default_timezone = "America/New_York"

[logging]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config.settings.schedule_days, 14);
        assert_eq!(config.settings.cache_wait_times_secs, 300);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, TracingOutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_is_default() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[settings]\nclosed_fill_days = 10").unwrap();

        let config = CliConfig::load_from(file.path()).unwrap();
        assert_eq!(config.settings.closed_fill_days, 10);
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut config = CliConfig::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(config.validate(), Err(CliError::Logging(_))));

        let mut config = CliConfig::default();
        config.settings.default_timezone = "Mars/Olympus".to_string();
        assert!(matches!(config.validate(), Err(CliError::Park(_))));
    }

    #[test]
    fn debug_flag_overrides_level() {
        let logging = LoggingSettings {
            level: "error".to_string(),
            format: TracingOutputFormat::Json,
        };
        let config = logging.tracing_config(true).unwrap();
        assert_eq!(config.default_level, tracing::Level::DEBUG);
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = CliConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[settings]"));
        assert!(text.contains("[logging]"));
        let parsed: CliConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
