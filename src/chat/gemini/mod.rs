
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{ChatMessage, ChatModel, Role};
use crate::config::ChatConfig;
use crate::http::HttpClient;

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiChatModel {
    endpoint: Url,
    api_key: String,
    temperature: f64,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiChatModel {
    #[inline]
    pub fn new(config: &ChatConfig, api_key: String) -> Result<Self> {
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| {
                base.join(&format!(
                    "/v1beta/models/{}:generateContent",
                    config.model
                ))
            })
            .with_context(|| format!("Invalid Gemini endpoint for model {}", config.model))?;

        let http = HttpClient::new(Duration::from_secs(config.timeout_seconds))
            .with_retry_attempts(config.retry_attempts);

        Ok(Self {
            endpoint,
            api_key,
            temperature: config.temperature,
            http,
        })
    }

    #[inline]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    #[inline]
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.http = self.http.with_body_logging(enabled);
        self
    }

    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ChatModel for GeminiChatModel {
    #[inline]
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = GenerateRequest {
            contents: messages
                .iter()
                .map(|message| Content {
                    role: match message.role {
                        Role::User => "user",
                        Role::Assistant => "model",
                    },
                    parts: vec![Part {
                        text: &message.text,
                    }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        debug!(
            "Sending {} messages to {}",
            request.contents.len(),
            self.endpoint
        );

        let response: GenerateResponse = self
            .http
            .post_json(
                &self.endpoint,
                &[("x-goog-api-key", self.api_key.as_str())],
                &request,
            )
            .context("Gemini request failed")?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .context("Gemini returned no candidates")?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(anyhow::anyhow!(
                "Gemini returned an empty answer (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ));
        }

        Ok(text)
    }
}
