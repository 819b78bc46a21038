//! Configuration file loading for neurocode.
//!
//! Reads `neurocode.toml` from the repository root and provides typed access
//! to thresholds, enabled checks, severity overrides, and embedding-provider
//! settings. Falls back to sensible defaults when the file is missing,
//! unreadable, or partially specified — unset keys keep their default.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_FANOUT_THRESHOLD: u32 = 10;
pub const DEFAULT_LONG_FUNCTION_THRESHOLD: u32 = 50;

pub const ALL_CHECKS: &[&str] = &[
    "UNUSED_IMPORT",
    "UNUSED_FUNCTION",
    "HIGH_FANOUT",
    "UNUSED_PARAM",
    "LONG_FUNCTION",
    "CALL_CYCLE",
];

/// Top-level neurocode configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fanout_threshold: u32,
    pub long_function_threshold: u32,
    pub enabled_checks: Vec<String>,
    pub severity_overrides: HashMap<String, String>,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub allow_dummy: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "dummy".to_string(),
            model: "dummy-v1".to_string(),
            allow_dummy: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fanout_threshold: DEFAULT_FANOUT_THRESHOLD,
            long_function_threshold: DEFAULT_LONG_FUNCTION_THRESHOLD,
            enabled_checks: ALL_CHECKS.iter().map(|s| s.to_string()).collect(),
            severity_overrides: HashMap::new(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `<repo_root>/neurocode.toml`.
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load(repo_root: &Path) -> Self {
        let config_path = repo_root.join("neurocode.toml");
        let content = match std::fs::read_to_string(&config_path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match toml::from_str::<PartialConfig>(&content) {
            Ok(partial) => partial.into_config(),
            Err(e) => {
                eprintln!(
                    "[neurocode] warning: failed to parse {}: {}, using defaults",
                    config_path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn is_check_enabled(&self, check: &str) -> bool {
        self.enabled_checks.iter().any(|c| c == check)
    }

    pub fn severity_for(&self, check: &str, default: &str) -> String {
        self.severity_overrides
            .get(check)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

/// Deserialization shape with every field optional, so a partially-specified
/// `neurocode.toml` layers cleanly over the built-in defaults.
#[derive(Debug, Deserialize, Default)]
struct PartialConfig {
    fanout_threshold: Option<u32>,
    long_function_threshold: Option<u32>,
    enabled_checks: Option<Vec<String>>,
    severity_overrides: Option<HashMap<String, String>>,
    embedding: Option<PartialEmbeddingConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct PartialEmbeddingConfig {
    provider: Option<String>,
    model: Option<String>,
    allow_dummy: Option<bool>,
}

impl PartialConfig {
    fn into_config(self) -> Config {
        let defaults = Config::default();
        let embedding_defaults = EmbeddingConfig::default();
        let embedding = self
            .embedding
            .map(|e| EmbeddingConfig {
                provider: e.provider.unwrap_or(embedding_defaults.provider.clone()),
                model: e.model.unwrap_or(embedding_defaults.model.clone()),
                allow_dummy: e.allow_dummy.unwrap_or(embedding_defaults.allow_dummy),
            })
            .unwrap_or(embedding_defaults);
        Config {
            fanout_threshold: self.fanout_threshold.unwrap_or(defaults.fanout_threshold),
            long_function_threshold: self
                .long_function_threshold
                .unwrap_or(defaults.long_function_threshold),
            enabled_checks: self.enabled_checks.unwrap_or(defaults.enabled_checks),
            severity_overrides: self.severity_overrides.unwrap_or_default(),
            embedding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.fanout_threshold, 10);
        assert_eq!(cfg.long_function_threshold, 50);
        assert_eq!(cfg.enabled_checks.len(), 6);
        assert!(cfg.severity_overrides.is_empty());
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let cfg = Config::load(Path::new("/nonexistent-neurocode-root"));
        assert_eq!(cfg.fanout_threshold, DEFAULT_FANOUT_THRESHOLD);
    }

    #[test]
    fn load_partial_toml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("neurocode.toml"),
            "fanout_threshold = 12\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path());
        assert_eq!(cfg.fanout_threshold, 12);
        assert_eq!(cfg.long_function_threshold, DEFAULT_LONG_FUNCTION_THRESHOLD);
        assert_eq!(cfg.enabled_checks.len(), 6);
    }

    #[test]
    fn load_full_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("neurocode.toml"),
            r#"
fanout_threshold = 20
long_function_threshold = 80
enabled_checks = ["UNUSED_IMPORT", "CALL_CYCLE"]

[severity_overrides]
UNUSED_IMPORT = "INFO"

[embedding]
provider = "openai"
model = "text-embedding-3-small"
allow_dummy = false
"#,
        )
        .unwrap();
        let cfg = Config::load(dir.path());
        assert_eq!(cfg.fanout_threshold, 20);
        assert_eq!(cfg.long_function_threshold, 80);
        assert_eq!(cfg.enabled_checks, vec!["UNUSED_IMPORT", "CALL_CYCLE"]);
        assert_eq!(cfg.severity_for("UNUSED_IMPORT", "WARNING"), "INFO");
        assert_eq!(cfg.embedding.provider, "openai");
        assert!(!cfg.embedding.allow_dummy);
    }

    #[test]
    fn is_check_enabled_reflects_config() {
        let mut cfg = Config::default();
        cfg.enabled_checks = vec!["UNUSED_IMPORT".to_string()];
        assert!(cfg.is_check_enabled("UNUSED_IMPORT"));
        assert!(!cfg.is_check_enabled("CALL_CYCLE"));
    }
}
