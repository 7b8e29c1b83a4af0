//! UI-agnostic chat log types
//!
//! These structures are shared by every front-end and don't depend on any
//! specific UI framework.

use serde::{Deserialize, Serialize};

/// The role of a chat log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
    Suggestion,
}

/// Structured payload attached to assistant and suggestion entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub feedback: Option<String>,
    pub message_rewrite: Option<String>,
    pub suggestions: Vec<String>,
    pub communication_tips: Vec<String>,
    pub original_input: Option<String>,
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.is_empty())
}

/// One entry in the chat panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLogEntry {
    pub role: ChatRole,
    pub message: String,
    pub response: Option<AssistantResponse>,
}

impl ChatLogEntry {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            message: message.into(),
            response: None,
        }
    }

    pub fn assistant(message: impl Into<String>, response: AssistantResponse) -> Self {
        Self {
            role: ChatRole::Assistant,
            message: message.into(),
            response: Some(response),
        }
    }

    pub fn suggestion(message: impl Into<String>, response: AssistantResponse) -> Self {
        Self {
            role: ChatRole::Suggestion,
            message: message.into(),
            response: Some(response),
        }
    }

    /// Text offered by the copy action: the rewrite, else the original input.
    pub fn copy_text(&self) -> Option<&str> {
        if self.role == ChatRole::User {
            return None;
        }
        let response = self.response.as_ref()?;
        non_empty(&response.message_rewrite).or_else(|| non_empty(&response.original_input))
    }
}

/// Append-only, in-memory chat history
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    entries: Vec<ChatLogEntry>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its index.
    pub fn push(&mut self, entry: ChatLogEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&ChatLogEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ChatLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
