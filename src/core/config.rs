use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Runtime configuration for the secretary. Read once at startup, read-only
/// afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct SecretaryConfig {
    /// Base URL of the Ollama endpoint.
    #[serde(default = "default_ollama_base_url")]
    pub ollama_base_url: String,

    /// Model identifier passed to Ollama's generate API.
    #[serde(default = "default_model")]
    pub model: String,

    /// Name (or path) of the TaskWarrior binary.
    #[serde(default = "default_task_bin")]
    pub task_bin: String,

    /// Maximum number of CLI submission attempts per task operation,
    /// including the first one.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Timeout for a single TaskWarrior invocation, in seconds.
    #[serde(default = "default_cli_timeout_secs")]
    pub cli_timeout_secs: u64,

    /// Timeout for a single language-model round trip, in seconds.
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,

    /// Append an insight derived from completed tasks after a successful
    /// task operation.
    #[serde(default = "default_insights")]
    pub insights: bool,
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "adrienbrault/nous-hermes2pro-llama3-8b:q8_0".to_string()
}
fn default_task_bin() -> String {
    "task".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_cli_timeout_secs() -> u64 {
    10
}
fn default_llm_timeout_secs() -> u64 {
    120
}
fn default_insights() -> bool {
    true
}

impl Default for SecretaryConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: default_ollama_base_url(),
            model: default_model(),
            task_bin: default_task_bin(),
            max_retries: default_max_retries(),
            cli_timeout_secs: default_cli_timeout_secs(),
            llm_timeout_secs: default_llm_timeout_secs(),
            insights: default_insights(),
        }
    }
}

impl SecretaryConfig {
    /// Load the config from `DONNA_CONFIG` if set, otherwise from
    /// `<config dir>/donna/config.toml`. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os("DONNA_CONFIG") {
            Some(p) => PathBuf::from(p),
            None => match dirs::config_dir() {
                Some(dir) => dir.join("donna").join("config.toml"),
                None => {
                    info!("No config directory available, using default config.");
                    return Ok(Self::default());
                }
            },
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults.", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: SecretaryConfig = toml::from_str(&content)?;
        info!(
            "Loaded config: model={}, task_bin={}, max_retries={}",
            config.model, config.task_bin, config.max_retries
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = SecretaryConfig::default();
        assert_eq!(config.task_bin, "task");
        assert_eq!(config.max_retries, 3);
        assert!(config.insights);
        assert_eq!(config.ollama_base_url, "http://localhost:11434");
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SecretaryConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model = "llama3:8b"
max_retries = 5
"#,
        )
        .unwrap();

        let config = SecretaryConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "llama3:8b");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.task_bin, "task");
        assert_eq!(config.cli_timeout_secs, 10);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [broken").unwrap();
        assert!(SecretaryConfig::load_from(&path).is_err());
    }
}
