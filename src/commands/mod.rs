
use anyhow::{Context, Result};
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::assistant::{Assistant, run_repl};
use crate::augmentor::RetrievalAugmentor;
use crate::chat::{ChatModel, GeminiChatModel, MessageWindowMemory};
use crate::config::{Config, ConfigError};
use crate::embeddings::{Embedder, OllamaClient};
use crate::ingest::Ingestor;
use crate::retrieval::{
    ContentRetriever, EmbeddingStoreRetriever, TavilyClient, WebSearchEngine, WebSearchRetriever,
};
use crate::router::{ClassifierRouter, GateRouter, QueryRouter, StaticRouter};

/// The assistant programs exposed as subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    /// AI document behind a oui/non/peut-être gate
    Gate,
    /// AI and cooking documents chosen by topic description
    Route,
    /// AI document and web search, always both
    Web,
}

impl Program {
    #[inline]
    pub fn needs_web_search(self) -> bool {
        self == Self::Web
    }
}

impl fmt::Display for Program {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gate => "gate",
            Self::Route => "route",
            Self::Web => "web",
        };
        f.write_str(name)
    }
}

/// Provider keys read from the environment
#[derive(Clone)]
pub struct ApiKeys {
    pub chat: String,
    pub web_search: Option<String>,
}

impl fmt::Debug for ApiKeys {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys")
            .field("chat", &"<redacted>")
            .field("web_search", &self.web_search.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ApiKeys {
    /// Read the keys `program` needs; a missing variable is a configuration error
    #[inline]
    pub fn from_env(config: &Config, program: Program) -> Result<Self, ConfigError> {
        let chat = config.chat.api_key()?;
        let web_search = if program.needs_web_search() {
            Some(config.web_search.api_key()?)
        } else {
            None
        };
        Ok(Self { chat, web_search })
    }
}

/// Ingest the configured documents and wire the assistant for `program`
#[inline]
pub fn build_assistant(program: Program, config: &Config, keys: &ApiKeys) -> Result<Assistant> {
    let temperature = if program.needs_web_search() {
        config.chat.web_temperature
    } else {
        config.chat.temperature
    };
    let gemini = GeminiChatModel::new(&config.chat, keys.chat.clone())?
        .with_temperature(temperature)
        .with_request_logging(config.logging.log_requests);
    debug!("Chat model endpoint: {}", gemini.endpoint());
    let model: Arc<dyn ChatModel> = Arc::new(gemini);

    let embedder: Arc<dyn Embedder> = Arc::new(
        OllamaClient::new(&config.ollama)?.with_request_logging(config.logging.log_requests),
    );
    let ingestor = Ingestor::new(config.chunking.clone(), Arc::clone(&embedder))
        .with_batch_size(usize::try_from(config.ollama.batch_size).unwrap_or(1));

    let ai = document_retriever("ia", &config.documents.ai, config, &ingestor, &embedder)?;

    let router: Arc<dyn QueryRouter> = match program {
        Program::Gate => Arc::new(GateRouter::new(
            Arc::clone(&model),
            ai,
            config.routing.maybe_policy,
        )),
        Program::Route => {
            let cooking = document_retriever(
                "cuisine",
                &config.documents.cooking,
                config,
                &ingestor,
                &embedder,
            )?;
            Arc::new(
                ClassifierRouter::new(
                    Arc::clone(&model),
                    vec![
                        (ai, config.documents.ai_description.clone()),
                        (cooking, config.documents.cooking_description.clone()),
                    ],
                )
                .with_fallback(config.routing.classifier_fallback),
            )
        }
        Program::Web => {
            let api_key = keys
                .web_search
                .clone()
                .ok_or_else(|| ConfigError::MissingApiKey(config.web_search.api_key_env.clone()))?;
            let engine: Arc<dyn WebSearchEngine> = Arc::new(
                TavilyClient::new(&config.web_search, api_key)?
                    .with_request_logging(config.logging.log_requests),
            );
            let web: Arc<dyn ContentRetriever> = Arc::new(WebSearchRetriever::new(
                "web",
                engine,
                config.web_search.max_results,
            ));
            Arc::new(StaticRouter::new(vec![ai, web]))
        }
    };

    info!("Assistant '{}' ready", program);

    Ok(Assistant::new(
        model,
        RetrievalAugmentor::new(router),
        MessageWindowMemory::with_max_messages(config.memory.max_messages),
    ))
}

fn document_retriever(
    name: &str,
    document: &Path,
    config: &Config,
    ingestor: &Ingestor,
    embedder: &Arc<dyn Embedder>,
) -> Result<Arc<dyn ContentRetriever>> {
    let path = config.document_path(document);
    let store = ingestor
        .ingest_path(&path)
        .with_context(|| format!("Failed to ingest the {} document", name))?;

    let retriever =
        EmbeddingStoreRetriever::new(name, store, Arc::clone(embedder), &config.retrieval);
    info!(
        "Document '{}' indexed as {} segments",
        name,
        retriever.store().len()
    );

    Ok(Arc::new(retriever))
}

/// Run `program` against stdin and stdout until "fin"
#[inline]
pub fn run_program(program: Program, config: &Config) -> Result<()> {
    let keys = ApiKeys::from_env(config, program)?;
    let mut assistant = build_assistant(program, config, &keys)?;

    let answered = run_repl(&mut assistant, io::stdin().lock(), io::stdout().lock())?;
    info!("{} answered {} questions", program, answered);

    Ok(())
}
