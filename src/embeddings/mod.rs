// Embeddings module
// Segment splitting and the Ollama embedding client

pub mod chunking;
pub mod ollama;

pub use chunking::{ChunkingConfig, TextSegment, split_document, split_text};
pub use ollama::OllamaClient;

/// Turns text into fixed-dimension vectors
pub trait Embedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embed several texts, returning one vector per input in order
    fn embed_all(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}
