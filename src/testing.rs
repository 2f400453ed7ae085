//! Fakes for the model and retrieval seams, shared by unit tests

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::chat::{ChatMessage, ChatModel};
use crate::embeddings::Embedder;
use crate::retrieval::{Content, ContentRetriever};

/// Chat model answering from a script and recording every conversation it saw
#[derive(Default)]
pub struct ScriptedChatModel {
    replies: RefCell<VecDeque<anyhow::Result<String>>>,
    pub calls: RefCell<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChatModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: RefCell::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            replies: RefCell::new(VecDeque::from([Err(anyhow::anyhow!(message.to_string()))])),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last_call(&self) -> Vec<ChatMessage> {
        self.calls.borrow().last().cloned().unwrap_or_default()
    }
}

impl ChatModel for ScriptedChatModel {
    fn chat(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        self.calls.borrow_mut().push(messages.to_vec());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
    }
}

/// Embedder with fixed vectors per text; unknown texts map to `fallback`
pub struct TableEmbedder {
    pub table: HashMap<String, Vec<f32>>,
    pub fallback: Vec<f32>,
}

impl TableEmbedder {
    pub fn new(entries: &[(&str, Vec<f32>)], fallback: Vec<f32>) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(text, vector)| ((*text).to_string(), vector.clone()))
                .collect(),
            fallback,
        }
    }
}

impl Embedder for TableEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Retriever returning canned contents and counting its calls
pub struct StaticRetriever {
    name: String,
    contents: Vec<Content>,
    pub calls: RefCell<Vec<String>>,
}

impl StaticRetriever {
    pub fn new(name: &str, texts: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            contents: texts
                .iter()
                .map(|text| Content {
                    text: (*text).to_string(),
                    score: None,
                    source: name.to_string(),
                })
                .collect(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ContentRetriever for StaticRetriever {
    fn name(&self) -> &str {
        &self.name
    }

    fn retrieve(&self, query: &str) -> anyhow::Result<Vec<Content>> {
        self.calls.borrow_mut().push(query.to_string());
        Ok(self.contents.clone())
    }
}
