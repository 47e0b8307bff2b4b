//! Plotter configuration.
//!
//! Every field has a default, so the configuration file is optional.
//! Command-line flags override values read from the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main plotter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Input and output directory roots.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Renderer configuration.
    #[serde(default)]
    pub render: RenderConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }
}

/// Directory roots. Results are read from
/// `<results_dir>/<run-id>/<experiment-id>` and plots written below
/// `<plots_dir>/<run-id>/<experiment-id>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default = "PathsConfig::default_results_dir")]
    pub results_dir: PathBuf,

    #[serde(default = "PathsConfig::default_plots_dir")]
    pub plots_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            results_dir: Self::default_results_dir(),
            plots_dir: Self::default_plots_dir(),
        }
    }
}

impl PathsConfig {
    fn default_results_dir() -> PathBuf {
        PathBuf::from("results")
    }

    fn default_plots_dir() -> PathBuf {
        PathBuf::from("plots")
    }
}

/// Renderer configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// gnuplot executable, looked up on PATH when not absolute.
    #[serde(default = "RenderConfig::default_program")]
    pub program: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: Self::default_program(),
        }
    }
}

impl RenderConfig {
    fn default_program() -> PathBuf {
        PathBuf::from("gnuplot")
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level. `RUST_LOG` takes precedence when set.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Prefix lines with a timestamp.
    #[serde(default)]
    pub timestamps: bool,

    /// Include the event target (module path).
    #[serde(default)]
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
            timestamps: false,
            target: false,
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(toml::de::Error),
}
