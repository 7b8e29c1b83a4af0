pub mod ai;
pub mod assist;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod extractor;
pub mod message_type;
pub mod panel;
pub mod popup;
pub mod prompt;
pub mod settings;
pub mod state;

// Re-export main types for convenience
pub use ai::{AssistantOutput, CompletionClient};
pub use assist::AssistRequest;
pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use config::Config;
pub use error::{AssistantError, Result};
pub use extractor::{ConversationExtractor, PageSource};
pub use message_type::MessageType;
pub use panel::{CopyConfirmation, PanelView};
pub use popup::{ApiKeyForm, SaveStatus};
pub use settings::{mask_secret, FileSettingsStore, MemorySettingsStore, SettingsStore};
pub use state::{AssistantResponse, ChatLog, ChatLogEntry, ChatRole};
