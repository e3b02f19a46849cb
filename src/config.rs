//! Engine configuration
//!
//! Defaults point at the public HPO release. A YAML file can override any
//! field, and `PHENOGRAPH_*` environment variables override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default remote ontology source
pub const DEFAULT_SOURCE_URL: &str = "https://purl.obolibrary.org/obo/hp.obo";

/// "Phenotypic abnormality", the root used for phenotype consolidation
pub const DEFAULT_ROOT_TERM: &str = "HP:0000118";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not read the config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML syntax or type error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Remote URL or local path of the OBO source
    pub source_url: String,
    /// Where the raw source is cached on disk
    pub cache_path: PathBuf,
    /// Upper bound for a remote fetch, in seconds
    pub fetch_timeout_secs: u64,
    /// Designated root term for depth, consolidation and chart building
    pub root_term: String,
    /// Entries kept by a closure session's LRU cache
    pub closure_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            cache_path: PathBuf::from("./data/ontologies/hp.obo"),
            fetch_timeout_secs: 60,
            root_term: DEFAULT_ROOT_TERM.to_string(),
            closure_cache_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Parse a YAML document; missing fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Apply `PHENOGRAPH_*` overrides from the process environment
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PHENOGRAPH_SOURCE_URL") {
            self.source_url = url;
        }
        if let Some(path) = lookup("PHENOGRAPH_CACHE_PATH") {
            self.cache_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("PHENOGRAPH_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "PHENOGRAPH_FETCH_TIMEOUT_SECS is not a number: {}",
                    secs
                ))
            })?;
        }
        if let Some(root) = lookup("PHENOGRAPH_ROOT_TERM") {
            self.root_term = root;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values the loader cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_secs must be > 0".to_string()));
        }
        if self.root_term.trim().is_empty() {
            return Err(ConfigError::Invalid("root_term must not be empty".to_string()));
        }
        if self.source_url.trim().is_empty() {
            return Err(ConfigError::Invalid("source_url must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.root_term, "HP:0000118");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "fetch_timeout_secs: 5\nroot_term: MONDO:0000001\n";
        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.fetch_timeout_secs, 5);
        assert_eq!(config.root_term, "MONDO:0000001");
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = EngineConfig::from_yaml_str("fetch_timeout_secs: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PHENOGRAPH_CACHE_PATH", "/tmp/hp.obo"),
            ("PHENOGRAPH_FETCH_TIMEOUT_SECS", "12"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.cache_path, PathBuf::from("/tmp/hp.obo"));
        assert_eq!(config.fetch_timeout_secs, 12);

        let bad = EngineConfig::default().with_overrides(|key| {
            (key == "PHENOGRAPH_FETCH_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(bad.is_err());
    }
}
