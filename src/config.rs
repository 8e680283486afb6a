//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::diary::DiaryOptions;
use crate::index::{DanglingPolicy, IndexConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub index: IndexSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Entry store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("photodiary").to_string_lossy().to_string())
        .unwrap_or_else(|| "./photodiary_data".to_string())
}

fn default_file_name() -> String {
    "entries.json".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: default_file_name(),
        }
    }
}

impl StoreConfig {
    /// Full path of the entry store file, with a leading `~` expanded
    pub fn store_path(&self) -> PathBuf {
        let dir = match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        };
        dir.join(&self.file_name)
    }
}

/// Index configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexSettings {
    /// Build the index when the diary opens instead of on first read
    #[serde(default)]
    pub eager_build: bool,

    #[serde(default)]
    pub dangling_policy: DanglingPolicy,
}

impl IndexSettings {
    pub fn diary_options(&self) -> DiaryOptions {
        DiaryOptions {
            eager_index: self.eager_build,
            index: IndexConfig {
                dangling_policy: self.dangling_policy,
            },
        }
    }
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

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
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
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("photodiary").join("config.toml")),
            Some(PathBuf::from("/etc/photodiary/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = var("PHOTODIARY_DATA_DIR") {
            self.store.data_dir = data_dir;
        }

        if let Some(eager) = var("PHOTODIARY_EAGER_INDEX") {
            match eager.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.index.eager_build = true,
                "0" | "false" | "no" => self.index.eager_build = false,
                other => tracing::warn!("Ignoring PHOTODIARY_EAGER_INDEX={}", other),
            }
        }
        if let Some(policy) = var("PHOTODIARY_DANGLING_POLICY") {
            match policy.parse() {
                Ok(p) => self.index.dangling_policy = p,
                Err(e) => tracing::warn!("Ignoring PHOTODIARY_DANGLING_POLICY: {}", e),
            }
        }

        if let Some(level) = var("PHOTODIARY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("PHOTODIARY_LOG_FORMAT") {
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
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Photodiary Configuration
#
# Environment variables override these settings:
# - PHOTODIARY_DATA_DIR
# - PHOTODIARY_EAGER_INDEX
# - PHOTODIARY_DANGLING_POLICY
# - PHOTODIARY_LOG_LEVEL
# - PHOTODIARY_LOG_FORMAT

[store]
# Directory holding the entry store
data_dir = "~/.local/share/photodiary"

# Entry store file name inside data_dir
file_name = "entries.json"

[index]
# Build the index on startup instead of on first read
eager_build = false

# Index entry missing from the store: "oldest" treats it as older than
# everything, "rebuild" rebuilds the index from the store
dangling_policy = "oldest"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
