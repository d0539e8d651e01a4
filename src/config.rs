/// Configuration loading
///
/// Reads `~/.aicmd/config.json`, fills in defaults and lets the usual
/// environment variables override API keys. Everything the rest of the
/// crate needs from the environment is resolved here, once.

use crate::error::{AicmdError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-user configuration directory under `$HOME`
pub const CONFIG_DIR_NAME: &str = ".aicmd";

/// Environment toggle for printing hints after a captured error
pub const AUTO_SUGGEST_ENV: &str = "AICMD_AUTO_SUGGEST";

/// Contents of config.json. Missing keys fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub openai_model: String,
    pub anthropic_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
    pub openai_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_endpoint: Option<String>,
    pub custom_headers: HashMap<String, String>,
    pub request_timeout_secs: u64,
    pub mailbox_max_age_secs: u64,
    pub record_history: bool,
    pub verbose: bool,
    /// File this config was read from; `None` when running on defaults
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_model: "gpt-4o-mini".to_string(),
            anthropic_model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 1000,
            temperature: 0.1,
            openai_api_key: None,
            anthropic_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            custom_endpoint: None,
            custom_headers: HashMap::new(),
            request_timeout_secs: 30,
            mailbox_max_age_secs: 30,
            record_history: true,
            verbose: false,
            loaded_from: None,
        }
    }
}

impl Config {
    /// Load config from `path`, or defaults when the file does not exist
    ///
    /// Nothing is logged here; logging is configured from the result.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default().with_env_overrides());
        }

        let raw = fs::read_to_string(path)?;
        let mut config = serde_json::from_str::<Config>(&raw).map_err(|e| {
            AicmdError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.loaded_from = Some(path.to_path_buf());

        Ok(config.with_env_overrides())
    }

    /// API keys from the environment take precedence over the file
    fn with_env_overrides(mut self) -> Self {
        if let Some(key) = non_empty_env("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(key) = non_empty_env("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(key);
        }
        self
    }

    /// Freshness window for mailbox reports; `None` disables the check
    pub fn mailbox_max_age(&self) -> Option<Duration> {
        match self.mailbox_max_age_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Process-wide settings resolved once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub home_dir: PathBuf,
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
    pub auto_suggest: bool,
}

impl Settings {
    /// Resolve settings from the environment
    ///
    /// # Arguments
    /// * `config_override` - Explicit `--config` path, if any
    pub fn resolve(config_override: Option<&Path>) -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| AicmdError::Config("Could not determine home directory".to_string()))?;

        let auto_suggest = auto_suggest_enabled(env::var(AUTO_SUGGEST_ENV).ok().as_deref());

        Ok(Self::with_home(home_dir, config_override, auto_suggest))
    }

    /// Build settings rooted at an explicit home directory
    pub fn with_home(home_dir: PathBuf, config_override: Option<&Path>, auto_suggest: bool) -> Self {
        let config_dir = home_dir.join(CONFIG_DIR_NAME);
        let config_path = config_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config_dir.join("config.json"));

        Self {
            home_dir,
            config_dir,
            config_path,
            auto_suggest,
        }
    }

    pub fn history_db_path(&self) -> PathBuf {
        self.config_dir.join("history.db")
    }
}

/// The toggle is on only for the literal value "1"
pub fn auto_suggest_enabled(value: Option<&str>) -> bool {
    value == Some("1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_auto_suggest_only_literal_one() {
        assert!(auto_suggest_enabled(Some("1")));
        assert!(!auto_suggest_enabled(None));
        assert!(!auto_suggest_enabled(Some("")));
        assert!(!auto_suggest_enabled(Some("true")));
        assert!(!auto_suggest_enabled(Some(" 1")));
        assert!(!auto_suggest_enabled(Some("0")));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("config.json")).unwrap();

        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.mailbox_max_age(), Some(Duration::from_secs(30)));
        assert!(config.record_history);
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"max_tokens": 256, "mailbox_max_age_secs": 0}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.mailbox_max_age(), None);
        assert_eq!(config.openai_model, "gpt-4o-mini");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        match Config::load(&path) {
            Err(AicmdError::Config(msg)) => assert!(msg.contains("config.json")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_records_source_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");

        let defaults = Config::load(&path).unwrap();
        assert_eq!(defaults.loaded_from, None);

        fs::write(&path, r#"{"verbose": true}"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert!(config.verbose);
        assert_eq!(config.loaded_from.as_deref(), Some(path.as_path()));

        // Never written back into the file format
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("loaded_from"));
    }

    #[test]
    fn test_settings_paths() {
        let settings = Settings::with_home(PathBuf::from("/home/user"), None, false);
        assert_eq!(settings.config_dir, PathBuf::from("/home/user/.aicmd"));
        assert_eq!(
            settings.config_path,
            PathBuf::from("/home/user/.aicmd/config.json")
        );
        assert_eq!(
            settings.history_db_path(),
            PathBuf::from("/home/user/.aicmd/history.db")
        );

        let custom = Settings::with_home(
            PathBuf::from("/home/user"),
            Some(Path::new("/etc/aicmd.json")),
            true,
        );
        assert_eq!(custom.config_path, PathBuf::from("/etc/aicmd.json"));
        assert!(custom.auto_suggest);
    }
}
