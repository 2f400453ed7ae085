// Chat module
// Message types, the chat model seam, prompt templates and conversation memory

pub mod gemini;
pub mod memory;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

pub use gemini::GeminiChatModel;
pub use memory::MessageWindowMemory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    #[inline]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    #[inline]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// A generative model answering a conversation
pub trait ChatModel {
    /// Reply to the conversation; the last message is the one to answer
    fn chat(&self, messages: &[ChatMessage]) -> anyhow::Result<String>;

    /// Single-turn convenience used for routing prompts
    fn ask(&self, prompt: &str) -> anyhow::Result<String> {
        self.chat(&[ChatMessage::user(prompt)])
    }
}

/// Prompt text with `{{name}}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    #[inline]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Substitute every `{{name}}` found in `variables` in one left-to-right pass.
    ///
    /// Inserted values are copied verbatim and never rescanned, so a value
    /// containing `{{other}}` stays as written. Unknown placeholders stay as-is.
    #[inline]
    pub fn apply(&self, variables: &HashMap<&str, &str>) -> String {
        let mut output = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some((before, after_open)) = rest.split_once("{{") {
            output.push_str(before);
            let substituted = after_open
                .split_once("}}")
                .and_then(|(name, after_close)| {
                    variables.get(name).map(|value| (*value, after_close))
                });

            match substituted {
                Some((value, after_close)) => {
                    output.push_str(value);
                    rest = after_close;
                }
                None => {
                    output.push_str("{{");
                    rest = after_open;
                }
            }
        }

        output.push_str(rest);
        output
    }
}
