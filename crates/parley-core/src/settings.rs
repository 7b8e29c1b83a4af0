//! Persistent key-value settings.
//!
//! The store holds plain string values under fixed keys. Today only the API
//! key lives here; the rest of the configuration is in [`crate::Config`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{AssistantError, Result};

/// Key under which the OpenAI API key is stored.
pub const API_KEY: &str = "apiKey";

/// Marker placed between the visible head and tail of a masked secret.
pub const MASK_ELLIPSIS: &str = "...";

/// A key-value store scoped to the application.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Mask a secret for display: first 6 characters, `...`, last 4 characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}{}{}", head, MASK_ELLIPSIS, tail)
}

/// Read the API key, treating blank values as absent.
pub fn read_api_key(store: &dyn SettingsStore) -> Result<Option<String>> {
    Ok(store.get(API_KEY)?.filter(|key| !key.trim().is_empty()))
}

/// Settings stored as a flat JSON object on disk.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.config/parley/settings.json`.
    pub fn open_default() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AssistantError::Storage("Could not determine config directory".to_string()))?;
        Ok(Self::new(config_dir.join("parley").join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            AssistantError::Storage(format!("{}: {}", self.path.display(), e))
        })
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&values)
            .map_err(|e| AssistantError::Storage(e.to_string()))?;
        fs::write(&self.path, content)?;
        tracing::debug!(key, path = %self.path.display(), "setting saved");
        Ok(())
    }
}

/// In-memory store, used by tests and `--ephemeral` runs.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(key: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(API_KEY.to_string(), key.to_string());
        }
        store
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| AssistantError::Storage("settings lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| AssistantError::Storage("settings lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
