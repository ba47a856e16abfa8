//! TOML configuration for the engine and its binary host.

use crate::application::approval::ApprovalWaiver;
use crate::application::queues::DequeueMatch;
use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LendingConfig {
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub government: GovernmentConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub dequeue_match: DequeueMatch,
    pub approval_waiver: ApprovalWaiver,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// RocksDB directory. The `--db-path` flag takes precedence.
    pub db_path: Option<PathBuf>,
}

/// Property hashes the built-in government registry reports as flagged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GovernmentConfig {
    pub liens: Vec<String>,
    pub house_owner_flags: Vec<String>,
    pub warning_shots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl LendingConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string. Missing sections take their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LendingError;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LendingConfig::from_toml("").unwrap();
        assert_eq!(config, LendingConfig::default());
        assert_eq!(config.engine.dequeue_match, DequeueMatch::RequestHash);
        assert_eq!(config.engine.approval_waiver, ApprovalWaiver::AnyFlagWaives);
        assert_eq!(config.log.filter, "info");
        assert!(config.storage.db_path.is_none());
        assert!(config.government.liens.is_empty());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            [engine]
            dequeue_match = "exact"
            approval_waiver = "any_flag_declines"

            [storage]
            db_path = "/var/lib/homelend"

            [government]
            liens = ["prop-7"]
            house_owner_flags = ["prop-8", "prop-9"]

            [log]
            filter = "homelend=debug"
        "#;
        let config = LendingConfig::from_toml(toml).unwrap();
        assert_eq!(config.engine.dequeue_match, DequeueMatch::Exact);
        assert_eq!(config.engine.approval_waiver, ApprovalWaiver::AnyFlagDeclines);
        assert_eq!(
            config.storage.db_path,
            Some(PathBuf::from("/var/lib/homelend"))
        );
        assert_eq!(config.government.liens, vec!["prop-7"]);
        assert_eq!(config.government.house_owner_flags, vec!["prop-8", "prop-9"]);
        assert!(config.government.warning_shots.is_empty());
        assert_eq!(config.log.filter, "homelend=debug");
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = LendingConfig::from_toml("[engine]\ndequeue_match = \"fuzzy\"\n");
        assert!(matches!(result, Err(LendingError::ConfigError(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = LendingConfig::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(LendingError::IoError(_))));
    }
}
