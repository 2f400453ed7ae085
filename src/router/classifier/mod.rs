
use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::QueryRouter;
use crate::chat::{ChatModel, PromptTemplate};
use crate::retrieval::ContentRetriever;

pub const DEFAULT_CLASSIFIER_TEMPLATE: &str = "Based on the user query, determine the most suitable data source(s) \
to retrieve relevant information from the following options:\n\
{{options}}\n\
It is very important that your answer consists of either a single number \
or multiple numbers separated by commas and nothing else!\n\
User query: {{query}}";

/// Behavior when the model's choice cannot be used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// Answer without retrieval
    #[default]
    DoNotRoute,
    /// Consult every retriever
    RouteToAll,
    /// Return the error to the caller
    Fail,
}

/// Lets the chat model pick retrievers from their topic descriptions
pub struct ClassifierRouter {
    model: Arc<dyn ChatModel>,
    options: Vec<(Arc<dyn ContentRetriever>, String)>,
    template: PromptTemplate,
    fallback: FallbackStrategy,
}

impl ClassifierRouter {
    #[inline]
    pub fn new(
        model: Arc<dyn ChatModel>,
        options: Vec<(Arc<dyn ContentRetriever>, String)>,
    ) -> Self {
        Self {
            model,
            options,
            template: PromptTemplate::new(DEFAULT_CLASSIFIER_TEMPLATE),
            fallback: FallbackStrategy::default(),
        }
    }

    #[inline]
    pub fn with_fallback(mut self, fallback: FallbackStrategy) -> Self {
        self.fallback = fallback;
        self
    }

    #[inline]
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Numbered option list, starting at 1
    fn options_text(&self) -> String {
        self.options
            .iter()
            .enumerate()
            .map(|(i, (_, description))| format!("{}: {}", i + 1, description))
            .join("\n")
    }

    /// Ask the model and return the zero-based indices it picked
    fn classify(&self, query: &str) -> Result<Vec<usize>> {
        let options = self.options_text();
        let prompt = self
            .template
            .apply(&HashMap::from([("options", options.as_str()), ("query", query)]));

        let reply = self
            .model
            .ask(&prompt)
            .context("Classifier routing request failed")?;
        info!(query, reply = reply.trim(), "Classifier routing reply");

        parse_selection(&reply, self.options.len())
    }

    fn fall_back(&self, error: anyhow::Error) -> Result<Vec<Arc<dyn ContentRetriever>>> {
        match self.fallback {
            FallbackStrategy::DoNotRoute => {
                warn!("Routing failed, answering without retrieval: {:#}", error);
                Ok(Vec::new())
            }
            FallbackStrategy::RouteToAll => {
                warn!("Routing failed, consulting every retriever: {:#}", error);
                Ok(self
                    .options
                    .iter()
                    .map(|(retriever, _)| Arc::clone(retriever))
                    .collect())
            }
            FallbackStrategy::Fail => Err(error),
        }
    }
}

impl QueryRouter for ClassifierRouter {
    #[inline]
    fn route(&self, query: &str) -> Result<Vec<Arc<dyn ContentRetriever>>> {
        match self.classify(query) {
            Ok(indices) => Ok(indices
                .into_iter()
                .map(|i| Arc::clone(&self.options[i].0))
                .collect()),
            Err(error) => self.fall_back(error),
        }
    }
}

/// Parse "2" or "1, 3" into zero-based indices below `option_count`
fn parse_selection(reply: &str, option_count: usize) -> Result<Vec<usize>> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("Empty routing answer"));
    }

    let indices: Vec<usize> = trimmed
        .split(',')
        .map(|part| {
            let part = part.trim();
            let number: usize = part
                .parse()
                .with_context(|| format!("'{}' is not an option number", part))?;
            if number == 0 || number > option_count {
                return Err(anyhow::anyhow!(
                    "Option {} is out of range 1..={}",
                    number,
                    option_count
                ));
            }
            Ok(number - 1)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(indices.into_iter().unique().collect())
}
