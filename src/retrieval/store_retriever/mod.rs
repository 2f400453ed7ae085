
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

use super::{Content, ContentRetriever};
use crate::config::RetrievalConfig;
use crate::embeddings::Embedder;
use crate::store::{InMemoryEmbeddingStore, SearchRequest};

/// Embeds the query and searches an in-memory store
pub struct EmbeddingStoreRetriever {
    name: String,
    store: InMemoryEmbeddingStore,
    embedder: Arc<dyn Embedder>,
    max_results: usize,
    min_score: f64,
}

impl EmbeddingStoreRetriever {
    #[inline]
    pub fn new(
        name: impl Into<String>,
        store: InMemoryEmbeddingStore,
        embedder: Arc<dyn Embedder>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            name: name.into(),
            store,
            embedder,
            max_results: config.max_results,
            min_score: config.min_score,
        }
    }

    #[inline]
    pub fn store(&self) -> &InMemoryEmbeddingStore {
        &self.store
    }
}

impl ContentRetriever for EmbeddingStoreRetriever {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn retrieve(&self, query: &str) -> Result<Vec<Content>> {
        let query_embedding = self
            .embedder
            .embed(query)
            .with_context(|| format!("Failed to embed query for {}", self.name))?;

        let matches = self.store.search(&SearchRequest {
            query_embedding: &query_embedding,
            max_results: self.max_results,
            min_score: self.min_score,
        });

        debug!("{} retrieved {} segments", self.name, matches.len());

        Ok(matches
            .into_iter()
            .map(|found| Content {
                text: found.segment.text,
                score: Some(found.score),
                source: self.name.clone(),
            })
            .collect())
    }
}
