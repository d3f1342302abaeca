//! Engine configuration, persisted as TOML.
//!
//! ```toml
//! log_filter = "ink_reason=debug"
//!
//! [fixpoint]
//! max_rounds = 64
//! parallel = false
//! record_provenance = true
//! ```
//!
//! Every key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::infer::FixpointConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub fixpoint: FixpointConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: "warn".into(),
            fixpoint: FixpointConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parse from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: "<memory>".into(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_all_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.fixpoint.parallel);
        assert!(config.fixpoint.max_rounds.is_none());
    }

    #[test]
    fn partial_fixpoint_table() {
        let config = EngineConfig::from_toml("[fixpoint]\nmax_rounds = 8\n").unwrap();
        assert_eq!(config.fixpoint.max_rounds, Some(8));
        assert!(config.fixpoint.record_provenance);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = EngineConfig::default();
        config.fixpoint.parallel = false;
        config.fixpoint.max_rounds = Some(3);
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn unknown_type_is_a_parse_error() {
        assert!(EngineConfig::from_toml("[fixpoint]\nparallel = \"yes\"\n").is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = EngineConfig::load(Path::new("/nonexistent/ink.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
