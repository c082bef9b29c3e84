//! Plugin arguments as delivered by the host's profile config.

use gangmem_core::ScoreMode;
use gangmem_core::config::PluginConfig;
use serde::{Deserialize, Serialize};

use crate::error::{PluginError, PluginResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginArgs {
    #[serde(default)]
    pub mode: Option<String>,
}

impl PluginArgs {
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: Some(mode.into()),
        }
    }

    /// Decode raw JSON args, e.g. `{"mode": "Most"}`.
    pub fn from_json(raw: &[u8]) -> PluginResult<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| PluginError::Config(format!("failed to decode plugin args: {e}")))
    }

    /// Resolve the scoring mode. Once args are supplied, `mode` must name a
    /// valid policy; an omitted field is rejected like any other bad value.
    pub fn score_mode(&self) -> PluginResult<ScoreMode> {
        self.mode
            .as_deref()
            .unwrap_or("")
            .parse::<ScoreMode>()
            .map_err(|e| PluginError::Config(e.to_string()))
    }
}

impl From<&PluginConfig> for PluginArgs {
    fn from(config: &PluginConfig) -> Self {
        Self {
            mode: config.mode.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_json_mode() {
        let args = PluginArgs::from_json(br#"{"mode": "Most"}"#).unwrap();
        assert_eq!(args.score_mode().unwrap(), ScoreMode::Most);
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = PluginArgs::new("Balanced").score_mode().unwrap_err();
        assert!(matches!(err, PluginError::Config(ref msg) if msg.contains("Balanced")));
    }

    #[test]
    fn rejects_missing_mode_field() {
        let args = PluginArgs::from_json(b"{}").unwrap();
        assert!(args.score_mode().is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = PluginArgs::from_json(b"mode=Most").unwrap_err();
        assert!(matches!(err, PluginError::Config(_)));
    }

    #[test]
    fn converts_from_config_table() {
        let config = PluginConfig {
            mode: Some("Least".to_string()),
        };
        let args = PluginArgs::from(&config);
        assert_eq!(args.score_mode().unwrap(), ScoreMode::Least);
    }
}
