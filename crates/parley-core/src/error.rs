use thiserror::Error;

/// Errors produced by the assistant workflow.
///
/// None of these are fatal: callers log them and return the UI to idle.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("OpenAI API key is not configured")]
    MissingApiKey,

    #[error("settings store error: {0}")]
    Storage(String),

    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    #[error("failed to load page {source_name}: {message}")]
    Page { source_name: String, message: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OpenAI API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("request task ended unexpectedly: {0}")]
    Task(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),
}

impl AssistantError {
    /// True for response-shape failures, as opposed to failures to get a
    /// response at all.
    pub fn is_parse(&self) -> bool {
        matches!(self, AssistantError::Parse(_))
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for AssistantError {
    fn from(err: std::io::Error) -> Self {
        AssistantError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;
