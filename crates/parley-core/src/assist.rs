//! The three request shapes the chat panel issues, and how each one turns a
//! model response into a chat log entry.

use crate::ai::{AssistantOutput, CompletionClient};
use crate::error::{AssistantError, Result};
use crate::message_type::MessageType;
use crate::prompt::{self, PromptPair};
use crate::state::{AssistantResponse, ChatLogEntry};

pub const MISSING_KEY_ALERT: &str = "OpenAI API Key is required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistRequest {
    /// Suggestions for one of the fixed message categories.
    Category(MessageType),
    /// A complete rewritten message for the active category.
    Rewrite {
        message_type: MessageType,
        input: Option<String>,
    },
    /// Improvement suggestions for text the user typed.
    InputReview { input: String },
}

impl AssistRequest {
    pub fn prompts(&self, context: &[String]) -> PromptPair {
        let user = match self {
            AssistRequest::Category(message_type) => prompt::category_prompt(*message_type, context),
            AssistRequest::Rewrite { message_type, input } => {
                prompt::rewrite_prompt(*message_type, context, input.as_deref())
            }
            AssistRequest::InputReview { input } => prompt::input_review_prompt(input),
        };

        PromptPair {
            system: prompt::system_prompt(context),
            user,
        }
    }

    /// Build the log entry for a response, or `None` when the response lacks
    /// the field this request shape needs.
    pub fn entry_for(&self, output: Option<AssistantOutput>) -> Option<ChatLogEntry> {
        let output = output?;

        match self {
            AssistRequest::Category(message_type) => {
                let suggestions = output.suggestions?;
                let title = format!("Suggestions for {}", message_type.label());
                Some(ChatLogEntry::suggestion(
                    title.clone(),
                    AssistantResponse {
                        feedback: Some(title),
                        suggestions,
                        communication_tips: output.communication_tips.unwrap_or_default(),
                        ..Default::default()
                    },
                ))
            }
            AssistRequest::Rewrite { message_type, .. } => {
                let title = format!("Generated {} Message", message_type.label());
                Some(ChatLogEntry::assistant(
                    title.clone(),
                    AssistantResponse {
                        feedback: Some(title),
                        message_rewrite: output.message_rewrite,
                        suggestions: output.suggestions.unwrap_or_default(),
                        communication_tips: output.communication_tips.unwrap_or_default(),
                        original_input: None,
                    },
                ))
            }
            AssistRequest::InputReview { input } => {
                let suggestions = output.input_suggestions?;
                Some(ChatLogEntry::suggestion(
                    "Input Message Suggestions",
                    AssistantResponse {
                        feedback: Some("Message Input Analysis".to_string()),
                        original_input: Some(input.clone()),
                        suggestions,
                        communication_tips: output.communication_tips.unwrap_or_default(),
                        ..Default::default()
                    },
                ))
            }
        }
    }

    /// Alert text shown when this request fails.
    pub fn failure_message(&self, err: &AssistantError) -> String {
        if matches!(err, AssistantError::MissingApiKey) {
            return MISSING_KEY_ALERT.to_string();
        }

        let parse = err.is_parse();
        let text = match self {
            AssistRequest::Category(_) if parse => "Failed to parse generated suggestions.",
            AssistRequest::Category(_) => "Failed to generate suggestions. Please try again.",
            AssistRequest::Rewrite { .. } if parse => "Failed to parse generated message.",
            AssistRequest::Rewrite { .. } => "Failed to generate message. Please try again.",
            AssistRequest::InputReview { .. } if parse => "Failed to parse generated suggestions.",
            AssistRequest::InputReview { .. } => {
                "Failed to generate input suggestions. Please try again."
            }
        };
        text.to_string()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AssistRequest::Category(_) => "category",
            AssistRequest::Rewrite { .. } => "rewrite",
            AssistRequest::InputReview { .. } => "input-review",
        }
    }
}

/// Run one request against the completion API.
pub async fn run(
    client: &CompletionClient,
    request: &AssistRequest,
    context: &[String],
) -> Result<Option<ChatLogEntry>> {
    let prompts = request.prompts(context);
    let output = client.complete(&prompts.system, &prompts.user).await?;
    let entry = request.entry_for(output);

    if entry.is_none() {
        tracing::warn!(kind = request.kind(), "response did not contain the expected output field");
    }
    Ok(entry)
}
