//! Prompt templates for the completion API.

use crate::message_type::MessageType;

/// Token in [`SYSTEM_PROMPT`] replaced by the extracted conversation.
pub const CONTEXT_PLACEHOLDER: &str = "{{current_message_context}}";

pub const SYSTEM_PROMPT: &str = r#"
You are Parley, an AI-powered communication helper designed to improve messaging effectiveness on freelance marketplaces.

Input Context:
Current Conversation: {{current_message_context}}
Sender's Role: {{sender_role}}
Recipient's Role: {{recipient_role}}

Your Tasks:

Analyze Message:
- Assess the clarity, professionalism, and tone of the message
- Identify potential areas of improvement
- Suggest diplomatic and effective communication strategies

Provide Suggestions:
- Offer concise, actionable recommendations
- Enhance communication without changing the core message
- Adapt suggestions to a professional marketplace context

Output Requirements:
- Return responses in JSON format
- Keep suggestions short, clear, and constructive
- Provide optional message rewrites
- Maintain professional yet friendly tone

Tone & Style:
- Be helpful and diplomatic
- Use professional language
- Add subtle encouragement

Example JSON Response:
{
  "output": {
    "feedback": "Your message is clear, but could be more specific about project details.",
    "suggestions": [
      "Add specific deliverables",
      "Clarify timeline expectations"
    ],
    "messageRewrite": "Hi, I'd like to discuss the project scope. Could we define the exact deliverables and expected timeline?",
    "communicationTips": [
      "Use specific examples",
      "Ask clarifying questions"
    ],
    "inputSuggestions": [
      "Open with a greeting",
      "State the question in the first sentence"
    ]
  }
}

Special Guidelines:
- Respect client-freelancer communication boundaries
- Avoid overly casual or too formal language
- Focus on clear, professional communication
"#;

/// System and user prompt for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

pub fn join_context(context: &[String]) -> String {
    context.join("\n")
}

/// Substitute the placeholder in `template` with the joined conversation.
pub fn fill_template(template: &str, context: &[String]) -> String {
    template.replacen(CONTEXT_PLACEHOLDER, &join_context(context), 1)
}

pub fn system_prompt(context: &[String]) -> String {
    fill_template(SYSTEM_PROMPT, context)
}

/// Ask for category suggestions for `message_type`.
pub fn category_prompt(message_type: MessageType, context: &[String]) -> String {
    format!(
        "Generate detailed communication suggestions for: {}.\n\
         Provide at least 5 specific, actionable suggestions.\n\
         Current conversation context: {}",
        message_type.instruction(),
        join_context(context)
    )
}

/// Ask for a complete rewritten message, optionally steered by user input.
pub fn rewrite_prompt(message_type: MessageType, context: &[String], input: Option<&str>) -> String {
    format!(
        "Generate a marketplace message for: {}.\n\
         Current conversation context: {}\n\
         Additional context: {}",
        message_type.instruction(),
        join_context(context),
        input.unwrap_or_default()
    )
}

/// Ask for improvement suggestions on free text the user typed.
pub fn input_review_prompt(input: &str) -> String {
    format!(
        "Analyze the following message and provide improvement suggestions:\n\
         Message: {}\n\
         Provide suggestions to:\n\
         1. Improve clarity\n\
         2. Enhance professionalism\n\
         3. Make the communication more effective\n\
         4. Identify potential communication gaps\n\
         Return them in the \"inputSuggestions\" field.",
        input
    )
}
