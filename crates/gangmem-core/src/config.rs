//! gangmem.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid score bounds: min {min} is greater than max {max}")]
    InvalidBounds { min: i64, max: i64 },

    #[error("invalid memory quantity {0:?}")]
    InvalidQuantity(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GangmemConfig {
    /// Raw plugin arguments. `None` means the plugin is built without args.
    pub plugin: Option<PluginConfig>,
    #[serde(default)]
    pub scoring: ScoreBounds,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Kept as a raw string; the plugin validates it at construction.
    pub mode: Option<String>,
}

/// Closed output range for normalized node scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBounds {
    pub min_node_score: i64,
    pub max_node_score: i64,
}

impl ScoreBounds {
    /// The scheduler framework's fixed range.
    pub const FRAMEWORK: ScoreBounds = ScoreBounds {
        min_node_score: 0,
        max_node_score: 100,
    };

    pub fn new(min_node_score: i64, max_node_score: i64) -> Result<Self, ConfigError> {
        let bounds = Self {
            min_node_score,
            max_node_score,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_node_score > self.max_node_score {
            return Err(ConfigError::InvalidBounds {
                min: self.min_node_score,
                max: self.max_node_score,
            });
        }
        Ok(())
    }
}

impl Default for ScoreBounds {
    fn default() -> Self {
        Self::FRAMEWORK
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` EnvFilter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info,gangmem_plugin=debug,gangmemd=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl GangmemConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GangmemConfig = toml::from_str(content)?;
        config.scoring.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a config selecting the given mode with framework bounds.
    pub fn scaffold(mode: &str) -> Self {
        GangmemConfig {
            plugin: Some(PluginConfig {
                mode: Some(mode.to_string()),
            }),
            scoring: ScoreBounds::FRAMEWORK,
            logging: LoggingConfig::default(),
        }
    }
}

/// Parse a memory quantity such as `"8Gi"`, `"512Mi"`, `"1G"` or `"1024"`
/// into bytes.
pub fn parse_memory_quantity(s: &str) -> Result<i64, ConfigError> {
    const SUFFIXES: &[(&str, i64)] = &[
        ("Ki", 1 << 10),
        ("Mi", 1 << 20),
        ("Gi", 1 << 30),
        ("Ti", 1 << 40),
        ("k", 1_000),
        ("M", 1_000_000),
        ("G", 1_000_000_000),
        ("T", 1_000_000_000_000),
    ];

    let trimmed = s.trim();
    let invalid = || ConfigError::InvalidQuantity(s.to_string());

    let (digits, multiplier) = SUFFIXES
        .iter()
        .find_map(|(suffix, mult)| trimmed.strip_suffix(*suffix).map(|d| (d, *mult)))
        .unwrap_or((trimmed, 1));

    let value: i64 = digits.parse().map_err(|_| invalid())?;
    if value < 0 {
        return Err(invalid());
    }
    value.checked_mul(multiplier).ok_or_else(invalid)
}
