#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, info};

use crate::retrieval::Content;
use crate::router::QueryRouter;

/// Marker line placed between the query and the injected contents
pub const CONTEXT_HEADER: &str = "Answer using the following information:";

/// The user message as sent to the model, with the contents it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedMessage {
    pub text: String,
    pub contents: Vec<Content>,
}

impl AugmentedMessage {
    /// Whether any retrieved content was injected
    #[inline]
    pub fn is_augmented(&self) -> bool {
        !self.contents.is_empty()
    }
}

/// Routes a query, gathers contents from the chosen retrievers and injects them
pub struct RetrievalAugmentor {
    router: Arc<dyn QueryRouter>,
}

impl RetrievalAugmentor {
    #[inline]
    pub fn new(router: Arc<dyn QueryRouter>) -> Self {
        Self { router }
    }

    #[inline]
    pub fn augment(&self, query: &str) -> Result<AugmentedMessage> {
        let retrievers = self.router.route(query).context("Query routing failed")?;
        debug!(
            "Routed to [{}]",
            retrievers.iter().map(|r| r.name()).join(", ")
        );

        let mut contents = Vec::new();
        for retriever in &retrievers {
            let found = retriever
                .retrieve(query)
                .with_context(|| format!("Retriever {} failed", retriever.name()))?;
            contents.extend(found);
        }

        info!(
            retrievers = retrievers.len(),
            contents = contents.len(),
            "Query augmented"
        );

        Ok(AugmentedMessage {
            text: inject(query, &contents),
            contents,
        })
    }
}

fn inject(query: &str, contents: &[Content]) -> String {
    if contents.is_empty() {
        return query.to_string();
    }

    format!(
        "{}\n\n{}\n{}",
        query,
        CONTEXT_HEADER,
        contents.iter().map(|c| c.text.as_str()).join("\n\n")
    )
}
