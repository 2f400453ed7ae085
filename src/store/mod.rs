#[cfg(test)]
mod tests;

use tracing::debug;
use uuid::Uuid;

use crate::embeddings::TextSegment;
use crate::{RagError, Result};

/// One stored `(embedding, segment)` pair
#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub id: Uuid,
    pub embedding: Vec<f32>,
    pub segment: TextSegment,
}

/// A store entry matched by a similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatch {
    pub id: Uuid,
    /// Relevance score in [0, 1]
    pub score: f64,
    pub segment: TextSegment,
}

/// Parameters of a nearest-neighbour search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest<'a> {
    pub query_embedding: &'a [f32],
    pub max_results: usize,
    pub min_score: f64,
}

/// Append-only in-memory vector store, searched by cosine similarity
#[derive(Debug, Default)]
pub struct InMemoryEmbeddingStore {
    entries: Vec<StoreEntry>,
}

impl InMemoryEmbeddingStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[StoreEntry] {
        &self.entries
    }

    #[inline]
    pub fn add(&mut self, embedding: Vec<f32>, segment: TextSegment) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.push(StoreEntry {
            id,
            embedding,
            segment,
        });
        id
    }

    /// Add one entry per segment; counts must match
    #[inline]
    pub fn add_all(
        &mut self,
        embeddings: Vec<Vec<f32>>,
        segments: Vec<TextSegment>,
    ) -> Result<Vec<Uuid>> {
        if embeddings.len() != segments.len() {
            return Err(RagError::Embedding(format!(
                "Cannot store {} embeddings for {} segments",
                embeddings.len(),
                segments.len()
            )));
        }

        let ids: Vec<Uuid> = embeddings
            .into_iter()
            .zip(segments)
            .map(|(embedding, segment)| self.add(embedding, segment))
            .collect();

        debug!("Stored {} entries ({} total)", ids.len(), self.len());
        Ok(ids)
    }

    /// Entries scoring at least `min_score`, best first, at most `max_results`
    #[inline]
    pub fn search(&self, request: &SearchRequest<'_>) -> Vec<EmbeddingMatch> {
        let mut matches: Vec<EmbeddingMatch> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let score = relevance_score(request.query_embedding, &entry.embedding)?;
                (score >= request.min_score).then(|| EmbeddingMatch {
                    id: entry.id,
                    score,
                    segment: entry.segment.clone(),
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(request.max_results);

        debug!(
            "Search matched {} of {} entries (min score {})",
            matches.len(),
            self.len(),
            request.min_score
        );
        matches
    }
}

/// Cosine similarity, or `None` for mismatched or zero vectors
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, norm_a, norm_b), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (x.mul_add(y, dot), x.mul_add(x, norm_a), y.mul_add(y, norm_b))
        },
    );

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    (denominator > 0.0).then(|| dot / denominator)
}

/// Cosine similarity rescaled from [-1, 1] to [0, 1]
#[inline]
pub fn relevance_score(a: &[f32], b: &[f32]) -> Option<f64> {
    cosine_similarity(a, b).map(|cosine| ((cosine + 1.0) / 2.0).clamp(0.0, 1.0))
}
