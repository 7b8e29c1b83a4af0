use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AssistantError, Result};
use crate::message_type::MessageType;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_WRAPPER_SELECTOR: &str = ".message-wrapper";
pub const DEFAULT_BODY_SELECTOR: &str = ".message-body";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub api_url: String,
    pub wrapper_selector: String,
    pub body_selector: String,
    /// Category selected when the panel opens.
    pub message_type: MessageType,
    /// Page to extract the conversation from (file path or URL).
    pub page: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            wrapper_selector: DEFAULT_WRAPPER_SELECTOR.to_string(),
            body_selector: DEFAULT_BODY_SELECTOR.to_string(),
            message_type: MessageType::default(),
            page: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        serde_json::from_str(&config_content).map_err(|e| {
            AssistantError::Storage(format!("{}: {}", config_path.display(), e))
        })
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)
            .map_err(|e| AssistantError::Storage(e.to_string()))?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// `~/.config/parley`, home of the config, settings and logs.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AssistantError::Storage("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("parley"))
    }

    /// `config.json` inside [`Config::config_dir`].
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.wrapper_selector, ".message-wrapper");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"model": "gpt-4o-mini", "page": "inbox.html", "message_type": "revision-request"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.message_type, MessageType::RevisionRequest);
        assert_eq!(config.page.as_deref(), Some("inbox.html"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.body_selector, DEFAULT_BODY_SELECTOR);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let config = Config {
            wrapper_selector: "li.msg".to_string(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
