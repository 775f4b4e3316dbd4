//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::align::{AlignOptions, OutputFormat};
use crate::matcher::{parse_offset, Threshold, DEFAULT_DELTA_SECS};
use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Matching behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Acceptance threshold in seconds (matches must be strictly closer)
    #[serde(default = "default_delta_secs")]
    pub delta_secs: u64,

    /// Clock-skew correction added to event times, e.g. "+2h" or "-05:00"
    #[serde(default)]
    pub offset: Option<String>,

    /// Also align events that already have a location
    #[serde(default)]
    pub include_located: bool,

    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_delta_secs() -> u64 {
    DEFAULT_DELTA_SECS
}

fn default_workers() -> usize {
    1
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            delta_secs: default_delta_secs(),
            offset: None,
            include_located: false,
            workers: default_workers(),
        }
    }
}

impl MatchingConfig {
    pub fn threshold(&self) -> Threshold {
        Threshold::from_secs(self.delta_secs)
    }

    /// Parsed offset, `None` when unset
    pub fn offset(&self) -> Result<Option<Duration>, ConfigError> {
        self.offset
            .as_deref()
            .map(|s| {
                parse_offset(s).map_err(|e| ConfigError::InvalidValue {
                    key: "matching.offset".to_string(),
                    error: e.to_string(),
                })
            })
            .transpose()
    }

    /// Options for an alignment run
    pub fn align_options(&self) -> Result<AlignOptions, ConfigError> {
        Ok(AlignOptions {
            threshold: self.threshold(),
            offset: self.offset()?,
            include_located: self.include_located,
            workers: self.workers.max(1),
        })
    }
}

/// Report output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// A config file that exists but cannot be read or parsed is an error,
    /// not a silent fallback to defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("trackmatch").join("config.toml")),
            Some(PathBuf::from("./trackmatch.toml")),
        ];

        Self::load_first_existing(config_paths.into_iter().flatten())
    }

    fn load_first_existing(
        paths: impl IntoIterator<Item = PathBuf>,
    ) -> Result<Self, ConfigError> {
        for path in paths {
            if path.exists() {
                let config = Self::load_with_env(&path)?;
                tracing::info!("Loaded config from {:?}", path);
                return Ok(config);
            }
        }

        // Fall back to environment-only config
        tracing::debug!("Using default config with environment overrides");
        Ok(Self::from_env())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (environment in production)
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Matching overrides
        if let Some(delta) = lookup("TRACKMATCH_DELTA") {
            if let Ok(d) = delta.parse() {
                self.matching.delta_secs = d;
            }
        }
        if let Some(offset) = lookup("TRACKMATCH_OFFSET") {
            self.matching.offset = Some(offset);
        }
        if let Some(workers) = lookup("TRACKMATCH_WORKERS") {
            if let Ok(w) = workers.parse() {
                self.matching.workers = w;
            }
        }

        // Output overrides
        if let Some(format) = lookup("TRACKMATCH_OUTPUT_FORMAT") {
            if let Ok(f) = format.parse() {
                self.output.format = f;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("TRACKMATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("TRACKMATCH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid value for {key}: {error}")]
    InvalidValue { key: String, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Trackmatch Configuration
#
# Environment variables override these settings:
# - TRACKMATCH_DELTA
# - TRACKMATCH_OFFSET
# - TRACKMATCH_WORKERS
# - TRACKMATCH_OUTPUT_FORMAT
# - TRACKMATCH_LOG_LEVEL
# - TRACKMATCH_LOG_FORMAT

[matching]
# Maximum gap in seconds between a photo and its track point.
# A gap exactly equal to this value is rejected.
delta_secs = 60

# Constant shift added to photo times before matching, for cameras whose
# clock was off. Examples: "+2h", "-05:00", "-3600", "1h30m"
# offset = "+0s"

# Also align photos that already have a location
include_located = false

# Worker threads used for large photo lists
workers = 1

[output]
# Report format: table, json, csv
format = "table"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.matching.delta_secs, 60);
        assert!(config.matching.offset.is_none());
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.logging.level, "info");

        let options = config.matching.align_options().unwrap();
        assert_eq!(options.threshold, Threshold::from_secs(60));
        assert!(options.offset.is_none());
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();

        assert_eq!(config.matching.delta_secs, 60);
        assert_eq!(config.matching.workers, 1);
        assert!(config.matching.offset.is_none());
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trackmatch.toml");
        std::fs::write(
            &path,
            "[matching]\ndelta_secs = 120\noffset = \"-1h\"\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.matching.delta_secs, 120);
        assert_eq!(config.matching.offset().unwrap(), Some(Duration::hours(-1)));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();

        let missing = Config::load(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[matching\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_malformed_default_file_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let bad = dir.path().join("trackmatch.toml");
        std::fs::write(&bad, "[matching]\ndelta_secs = \"abc\"\n").unwrap();

        let result = Config::load_first_existing([missing.clone(), bad]);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));

        assert!(Config::load_first_existing([missing]).is_ok());
    }

    #[test]
    fn test_first_existing_file_wins() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        std::fs::write(&first, "[output]\nformat = \"json\"\n").unwrap();
        std::fs::write(&second, "[output]\nformat = \"csv\"\n").unwrap();

        let config = Config::load_first_existing([dir.path().join("none.toml"), first, second])
            .unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_offset() {
        let config = MatchingConfig {
            offset: Some("sometime".to_string()),
            ..MatchingConfig::default()
        };

        assert!(matches!(
            config.align_options(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TRACKMATCH_DELTA", "30"),
            ("TRACKMATCH_OFFSET", "+200"),
            ("TRACKMATCH_WORKERS", "not-a-number"),
            ("TRACKMATCH_OUTPUT_FORMAT", "csv"),
            ("TRACKMATCH_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.matching.delta_secs, 30);
        assert_eq!(config.matching.offset().unwrap(), Some(Duration::seconds(200)));
        // Unparseable values are ignored
        assert_eq!(config.matching.workers, 1);
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }
}
