
use std::collections::VecDeque;
use tracing::debug;

use super::ChatMessage;

/// Conversation history capped at `max_messages`, evicting the oldest first
#[derive(Debug, Clone)]
pub struct MessageWindowMemory {
    max_messages: usize,
    messages: VecDeque<ChatMessage>,
}

impl MessageWindowMemory {
    #[inline]
    pub fn with_max_messages(max_messages: usize) -> Self {
        let max_messages = max_messages.max(1);
        Self {
            max_messages,
            messages: VecDeque::with_capacity(max_messages),
        }
    }

    #[inline]
    pub fn add(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.max_messages {
            if let Some(evicted) = self.messages.pop_front() {
                debug!("Evicted {:?} message from chat memory", evicted.role);
            }
        }
    }

    #[inline]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[inline]
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }
}
