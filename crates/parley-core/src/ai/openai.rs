use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AssistantError, Result};
use crate::settings::{read_api_key, SettingsStore};

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    response_format: ResponseFormat,
    messages: Vec<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

/// The `output` object the model is instructed to return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantOutput {
    pub feedback: Option<String>,
    pub message_rewrite: Option<String>,
    pub suggestions: Option<Vec<String>>,
    pub communication_tips: Option<Vec<String>>,
    pub input_suggestions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct OutputEnvelope {
    output: Option<AssistantOutput>,
}

/// Parse message content of the form `{ "output": { ... } }`.
pub fn parse_output(content: &str) -> Result<Option<AssistantOutput>> {
    let envelope: OutputEnvelope = serde_json::from_str(content)?;
    Ok(envelope.output)
}

/// Chat-completion client that reads the API key from the settings store
/// before every request.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    api_url: String,
    model: String,
    store: Arc<dyn SettingsStore>,
}

impl CompletionClient {
    pub fn new(store: Arc<dyn SettingsStore>, api_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.to_string(),
            model: model.to_string(),
            store,
        }
    }

    pub fn from_config(store: Arc<dyn SettingsStore>, config: &Config) -> Self {
        Self::new(store, &config.api_url, &config.model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a system/user exchange and parse the JSON `output` envelope.
    ///
    /// Returns [`AssistantError::MissingApiKey`] without touching the network
    /// when no key is stored.
    pub async fn complete(&self, system: &str, user: &str) -> Result<Option<AssistantOutput>> {
        let api_key = read_api_key(self.store.as_ref())?.ok_or(AssistantError::MissingApiKey)?;

        let request = OpenAIRequest {
            model: self.model.clone(),
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: system.to_string(),
                },
                OpenAIMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
        };

        tracing::debug!(model = %self.model, url = %self.api_url, "sending completion request");

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = response.text().await?;
        let openai_response: OpenAIResponse = serde_json::from_str(&body)?;
        let content = openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AssistantError::Parse("response contained no message content".to_string()))?;

        parse_output(&content)
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "gpt-3.5-turbo".to_string(),
            "gpt-4o-mini".to_string(),
            "gpt-4o".to_string(),
            "gpt-4-turbo".to_string(),
        ]
    }
}
