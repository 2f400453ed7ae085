
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{Content, ContentRetriever};
use crate::config::WebSearchConfig;
use crate::http::HttpClient;

/// One organic result from a web search
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebSearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    pub score: Option<f64>,
}

/// A web search provider
pub trait WebSearchEngine {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebSearchResult>>;
}

/// Tavily `/search` client
#[derive(Debug, Clone)]
pub struct TavilyClient {
    endpoint: Url,
    api_key: String,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<WebSearchResult>,
}

impl TavilyClient {
    #[inline]
    pub fn new(config: &WebSearchConfig, api_key: String) -> Result<Self> {
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join("/search"))
            .with_context(|| format!("Invalid Tavily URL: {}", config.base_url))?;

        Ok(Self {
            endpoint,
            api_key,
            http: HttpClient::new(Duration::from_secs(config.timeout_seconds)),
        })
    }

    #[inline]
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.http = self.http.with_body_logging(enabled);
        self
    }
}

impl WebSearchEngine for TavilyClient {
    #[inline]
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebSearchResult>> {
        let request = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results,
        };

        let response: SearchResponse = self
            .http
            .post_json(&self.endpoint, &[], &request)
            .context("Tavily search failed")?;

        debug!("Tavily returned {} results", response.results.len());
        Ok(response.results)
    }
}

/// Turns web search results into retrieval contents
pub struct WebSearchRetriever {
    name: String,
    engine: Arc<dyn WebSearchEngine>,
    max_results: usize,
}

impl WebSearchRetriever {
    #[inline]
    pub fn new(name: impl Into<String>, engine: Arc<dyn WebSearchEngine>, max_results: usize) -> Self {
        Self {
            name: name.into(),
            engine,
            max_results,
        }
    }
}

impl ContentRetriever for WebSearchRetriever {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn retrieve(&self, query: &str) -> Result<Vec<Content>> {
        let mut results = self.engine.search(query, self.max_results)?;

        // Stable: unscored results keep the provider's order
        results.sort_by(|a, b| {
            b.score
                .unwrap_or_default()
                .total_cmp(&a.score.unwrap_or_default())
        });
        results.truncate(self.max_results);

        Ok(results
            .into_iter()
            .map(|result| Content {
                text: if result.content.is_empty() {
                    result.title
                } else {
                    format!("{}\n{}", result.title, result.content)
                },
                score: result.score,
                source: self.name.clone(),
            })
            .collect())
    }
}
