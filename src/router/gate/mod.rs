
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::QueryRouter;
use crate::chat::{ChatModel, PromptTemplate};
use crate::retrieval::ContentRetriever;

pub const DEFAULT_GATE_TEMPLATE: &str = "Est-ce que la requête suivante concerne l'intelligence artificielle, le RAG ou le fine-tuning ?\n\
Question : '{{question}}'\n\
Réponds uniquement par : 'oui', 'non' ou 'peut-être'.";

/// The model's verdict on whether a query is in the gated topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAnswer {
    Yes,
    No,
    /// "peut-être", or any reply with neither "oui" nor "non"
    Maybe,
}

impl GateAnswer {
    /// Classify a raw reply; "non" wins over everything else
    #[inline]
    pub fn parse(reply: &str) -> Self {
        let normalized = reply.trim().to_lowercase();
        if normalized.contains("non") {
            Self::No
        } else if normalized.contains("oui") {
            Self::Yes
        } else {
            Self::Maybe
        }
    }
}

/// What to do with a `Maybe` answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaybePolicy {
    /// Consult the retriever, like a "oui"
    #[default]
    Retrieve,
    /// Answer without retrieval, like a "non"
    Skip,
}

/// Asks the chat model a yes/no/maybe question before retrieving
pub struct GateRouter {
    model: Arc<dyn ChatModel>,
    retriever: Arc<dyn ContentRetriever>,
    template: PromptTemplate,
    maybe_policy: MaybePolicy,
}

impl GateRouter {
    #[inline]
    pub fn new(
        model: Arc<dyn ChatModel>,
        retriever: Arc<dyn ContentRetriever>,
        maybe_policy: MaybePolicy,
    ) -> Self {
        Self {
            model,
            retriever,
            template: PromptTemplate::new(DEFAULT_GATE_TEMPLATE),
            maybe_policy,
        }
    }

    #[inline]
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Ask the model and classify its reply
    #[inline]
    pub fn decide(&self, query: &str) -> Result<GateAnswer> {
        let prompt = self.template.apply(&HashMap::from([("question", query)]));
        let reply = self
            .model
            .ask(&prompt)
            .context("Gate routing request failed")?;
        let answer = GateAnswer::parse(&reply);

        info!(
            query,
            reply = reply.trim(),
            ?answer,
            "Routing decision from the language model"
        );

        Ok(answer)
    }
}

impl QueryRouter for GateRouter {
    #[inline]
    fn route(&self, query: &str) -> Result<Vec<Arc<dyn ContentRetriever>>> {
        let retrieve = match self.decide(query)? {
            GateAnswer::Yes => true,
            GateAnswer::No => false,
            GateAnswer::Maybe => self.maybe_policy == MaybePolicy::Retrieve,
        };

        Ok(if retrieve {
            vec![Arc::clone(&self.retriever)]
        } else {
            Vec::new()
        })
    }
}
