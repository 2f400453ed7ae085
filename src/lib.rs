use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Chat model error: {0}")]
    Chat(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod assistant;
pub mod augmentor;
pub mod chat;
pub mod commands;
pub mod config;
pub mod document;
pub mod embeddings;
pub mod http;
pub mod ingest;
pub mod logging;
pub mod retrieval;
pub mod router;
pub mod store;

#[cfg(test)]
mod testing;
