//! API key form state for the settings screen.

use std::time::{Duration, Instant};

use crate::settings::{mask_secret, SettingsStore, API_KEY};

/// How long a save status stays visible.
pub const STATUS_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Success,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct ApiKeyForm {
    pub input: String,
    pub cursor: usize,
    /// Masked form of the last stored key.
    pub saved_display: Option<String>,
    pub show_raw: bool,
    pub loaded: bool,
    status: SaveStatus,
    status_until: Option<Instant>,
}

impl ApiKeyForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the form from the store. Read failures leave the form empty.
    pub fn load(&mut self, store: &dyn SettingsStore) {
        match store.get(API_KEY) {
            Ok(Some(key)) if !key.is_empty() => {
                self.saved_display = Some(mask_secret(&key));
                self.cursor = key.chars().count();
                self.input = key;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "failed to load API key");
            }
        }
        self.loaded = true;
    }

    pub fn toggle_visibility(&mut self) {
        self.show_raw = !self.show_raw;
    }

    /// Persist the trimmed input. Blank input never reaches the store.
    pub fn save(&mut self, store: &dyn SettingsStore, now: Instant) -> SaveStatus {
        let key = self.input.trim().to_string();
        if key.is_empty() {
            self.set_status(SaveStatus::Error, now);
            return self.status;
        }

        match store.set(API_KEY, &key) {
            Ok(()) => {
                self.saved_display = Some(mask_secret(&key));
                self.cursor = key.chars().count();
                self.input = key;
                tracing::info!("API key saved");
                self.set_status(SaveStatus::Success, now);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save API key");
                self.set_status(SaveStatus::Error, now);
            }
        }
        self.status
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Clear an expired status.
    pub fn tick(&mut self, now: Instant) {
        if let Some(until) = self.status_until {
            if now >= until {
                self.status = SaveStatus::Idle;
                self.status_until = None;
            }
        }
    }

    /// What the input field shows: the raw key, or bullets when hidden.
    pub fn display_input(&self) -> String {
        if self.show_raw {
            self.input.clone()
        } else {
            "•".repeat(self.input.chars().count())
        }
    }

    fn set_status(&mut self, status: SaveStatus, now: Instant) {
        self.status = status;
        self.status_until = Some(now + STATUS_DURATION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AssistantError, Result};
    use crate::settings::MemorySettingsStore;

    struct BrokenStore;

    impl SettingsStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(AssistantError::Storage("disk on fire".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(AssistantError::Storage("read-only".to_string()))
        }
    }

    #[test]
    fn test_load_masks_stored_key() {
        let store = MemorySettingsStore::with_api_key("sk-ABCDEFGHIJ1234567890");
        let mut form = ApiKeyForm::new();
        form.load(&store);

        assert!(form.loaded);
        assert_eq!(form.saved_display.as_deref(), Some("sk-ABC...7890"));
        assert_eq!(form.input, "sk-ABCDEFGHIJ1234567890");
    }

    #[test]
    fn test_load_failure_degrades_to_empty() {
        let mut form = ApiKeyForm::new();
        form.load(&BrokenStore);
        assert!(form.loaded);
        assert!(form.input.is_empty());
        assert_eq!(form.saved_display, None);
    }

    #[test]
    fn test_blank_save_never_touches_store() {
        let store = MemorySettingsStore::new();
        let mut form = ApiKeyForm::new();
        let now = Instant::now();

        for blank in ["", "   ", "\t\n"] {
            form.input = blank.to_string();
            assert_eq!(form.save(&store, now), SaveStatus::Error);
            assert_eq!(store.get(API_KEY).unwrap(), None);
        }
    }

    #[test]
    fn test_save_success_then_auto_clear() {
        let store = MemorySettingsStore::new();
        let mut form = ApiKeyForm::new();
        let now = Instant::now();
        form.input = "sk-live-0123456789".to_string();

        assert_eq!(form.save(&store, now), SaveStatus::Success);
        assert_eq!(store.get(API_KEY).unwrap().as_deref(), Some("sk-live-0123456789"));
        assert_eq!(form.saved_display.as_deref(), Some("sk-liv...6789"));

        form.tick(now + Duration::from_secs(1));
        assert_eq!(form.status(), SaveStatus::Success);
        form.tick(now + STATUS_DURATION);
        assert_eq!(form.status(), SaveStatus::Idle);
    }

    #[test]
    fn test_save_trims_pasted_key() {
        let store = MemorySettingsStore::new();
        let mut form = ApiKeyForm::new();
        form.input = "  sk-ABCDEFGHIJ1234567890\n".to_string();

        assert_eq!(form.save(&store, Instant::now()), SaveStatus::Success);
        assert_eq!(store.get(API_KEY).unwrap().as_deref(), Some("sk-ABCDEFGHIJ1234567890"));
        assert_eq!(form.saved_display.as_deref(), Some("sk-ABC...7890"));
        assert_eq!(form.input, "sk-ABCDEFGHIJ1234567890");
        assert_eq!(form.cursor, 23);
    }

    #[test]
    fn test_error_status_auto_clears() {
        let mut form = ApiKeyForm::new();
        let now = Instant::now();
        assert_eq!(form.save(&MemorySettingsStore::new(), now), SaveStatus::Error);
        form.tick(now + STATUS_DURATION + Duration::from_millis(1));
        assert_eq!(form.status(), SaveStatus::Idle);
    }

    #[test]
    fn test_store_write_failure_is_error() {
        let mut form = ApiKeyForm::new();
        form.input = "sk-whatever-1234".to_string();
        assert_eq!(form.save(&BrokenStore, Instant::now()), SaveStatus::Error);
        assert_eq!(form.saved_display, None);
    }

    #[test]
    fn test_visibility_toggle() {
        let mut form = ApiKeyForm::new();
        form.input = "sk-abc".to_string();
        assert_eq!(form.display_input(), "••••••");
        form.toggle_visibility();
        assert_eq!(form.display_input(), "sk-abc");
    }
}
