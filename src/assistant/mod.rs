#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info};

use crate::augmentor::RetrievalAugmentor;
use crate::chat::{ChatMessage, ChatModel, MessageWindowMemory};

pub const SEPARATOR: &str = "==================================================";
pub const PROMPT: &str = "Posez une question (ou 'fin' pour arrêter) :";
/// Input that ends the conversation, compared case-insensitively
pub const STOP_WORD: &str = "fin";

/// Chat model with retrieval augmentation and a sliding conversation memory
pub struct Assistant {
    model: Arc<dyn ChatModel>,
    augmentor: RetrievalAugmentor,
    memory: MessageWindowMemory,
}

impl Assistant {
    #[inline]
    pub fn new(
        model: Arc<dyn ChatModel>,
        augmentor: RetrievalAugmentor,
        memory: MessageWindowMemory,
    ) -> Self {
        Self {
            model,
            augmentor,
            memory,
        }
    }

    #[inline]
    pub fn memory(&self) -> &MessageWindowMemory {
        &self.memory
    }

    /// Answer one user message.
    ///
    /// Memory keeps the message as typed; only the request sent to the model
    /// carries the retrieved contents.
    #[inline]
    pub fn chat(&mut self, message: &str) -> Result<String> {
        let augmented = self.augmentor.augment(message)?;

        self.memory.add(ChatMessage::user(message));
        let mut request = self.memory.messages();
        if let Some(last) = request.last_mut() {
            last.text = augmented.text;
        }
        debug!(
            "Sending {} of at most {} messages ({} retrieved contents)",
            request.len(),
            self.memory.max_messages(),
            augmented.contents.len()
        );

        let reply = self
            .model
            .chat(&request)
            .context("Chat model request failed")?;
        self.memory.add(ChatMessage::assistant(reply.clone()));

        Ok(reply)
    }
}

/// Where the read loop stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplState {
    AwaitingInput,
    Terminated,
}

/// What to do with one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    Stop,
    Skip,
    Ask(String),
}

impl ReplState {
    /// Transition on one input line; `None` is end of input
    #[inline]
    pub fn next(self, line: Option<&str>) -> (Self, ReplAction) {
        if self == Self::Terminated {
            return (Self::Terminated, ReplAction::Stop);
        }

        match line.map(str::trim) {
            None => (Self::Terminated, ReplAction::Stop),
            Some(input) if input.eq_ignore_ascii_case(STOP_WORD) => {
                (Self::Terminated, ReplAction::Stop)
            }
            Some("") => (Self::AwaitingInput, ReplAction::Skip),
            Some(input) => (Self::AwaitingInput, ReplAction::Ask(input.to_string())),
        }
    }
}

/// Prompt on `output`, read questions from `input` and print the answers
/// until "fin" or end of input. Returns the number of answered questions.
#[inline]
pub fn run_repl<R: BufRead, W: Write>(
    assistant: &mut Assistant,
    mut input: R,
    mut output: W,
) -> Result<usize> {
    let mut state = ReplState::AwaitingInput;
    let mut answered = 0;
    let mut line = String::new();

    while state == ReplState::AwaitingInput {
        writeln!(output, "{}", SEPARATOR)?;
        writeln!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        let read = input
            .read_line(&mut line)
            .context("Failed to read from standard input")?;
        let (next, action) = state.next((read > 0).then_some(line.as_str()));
        state = next;

        match action {
            ReplAction::Stop => info!("Conversation ended after {} questions", answered),
            ReplAction::Skip => {}
            ReplAction::Ask(question) => {
                let reply = assistant.chat(&question)?;
                writeln!(output, "Assistant : {}", reply)?;
                answered += 1;
            }
        }
    }

    Ok(answered)
}
