// Retrieval module
// The retriever seam and its document and web search implementations

pub mod store_retriever;
pub mod web;

pub use store_retriever::EmbeddingStoreRetriever;
pub use web::{TavilyClient, WebSearchEngine, WebSearchResult, WebSearchRetriever};

/// A piece of retrieved text
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub text: String,
    /// Relevance score when the source ranks its results
    pub score: Option<f64>,
    /// Name of the retriever that produced it
    pub source: String,
}

/// A source of context for a query
pub trait ContentRetriever {
    /// Short name used in logs and routing prompts
    fn name(&self) -> &str;

    /// Contents relevant to `query`, best first
    fn retrieve(&self, query: &str) -> anyhow::Result<Vec<Content>>;
}
