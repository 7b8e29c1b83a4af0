pub mod openai;

pub use openai::{parse_output, AssistantOutput, CompletionClient};
