// Query routing
// Decides which retrievers a query should consult

pub mod classifier;
pub mod gate;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::retrieval::ContentRetriever;

pub use classifier::{ClassifierRouter, FallbackStrategy};
pub use gate::{GateAnswer, GateRouter, MaybePolicy};

/// Chooses the retrievers for a query, in the order they should be consulted
pub trait QueryRouter {
    fn route(&self, query: &str) -> anyhow::Result<Vec<Arc<dyn ContentRetriever>>>;
}

/// Routes every query to all of its retrievers
pub struct StaticRouter {
    retrievers: Vec<Arc<dyn ContentRetriever>>,
}

impl StaticRouter {
    #[inline]
    pub fn new(retrievers: Vec<Arc<dyn ContentRetriever>>) -> Self {
        Self { retrievers }
    }
}

impl QueryRouter for StaticRouter {
    #[inline]
    fn route(&self, _query: &str) -> anyhow::Result<Vec<Arc<dyn ContentRetriever>>> {
        Ok(self.retrievers.clone())
    }
}
