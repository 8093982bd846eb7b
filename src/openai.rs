//! OpenAI-backed embedding and completion providers.
//!
//! Both providers call the OpenAI REST API directly with `reqwest`:
//! [`OpenAiEmbeddings`] wraps `/v1/embeddings` and [`OpenAiCompletions`]
//! wraps `/v1/chat/completions` as a single-turn completion.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::completion::CompletionProvider;
use crate::config::KbConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{KbError, Result};

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// The sampling temperature used for knowledge base completions.
const COMPLETION_TEMPERATURE: f32 = 0.7;

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Extract a human-readable message from an OpenAI error body, falling back
/// to the raw body when it is not the documented error shape.
fn error_detail(body: String) -> String {
    serde_json::from_str::<ApiErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body)
}

// ── Embeddings ──────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddings {
    /// Create a new provider with the given API key and the default
    /// embedding model.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::InvalidConfiguration`] for an empty API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(KbError::InvalidConfiguration(
                "embedding API key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a provider from a [`KbConfig`].
    pub fn from_config(config: &KbConfig) -> Result<Self> {
        Ok(Self::new(config.api_key.clone())?.with_model(config.embedding_model.clone()))
    }

    /// Set the embedding model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the reported embedding dimensionality.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "OpenAI", text_len = text.len(), "embedding single text");

        let results = self.embed_documents(&[text]).await?;
        results.into_iter().next().ok_or_else(|| KbError::Embedding {
            provider: "OpenAI".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "OpenAI",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest { model: &self.model, input: texts.to_vec() };

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "embedding request failed");
                KbError::Embedding {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(provider = "OpenAI", %status, "embedding API error");
            return Err(KbError::Embedding {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse embedding response");
            KbError::Embedding {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Completions ─────────────────────────────────────────────────────

/// A [`CompletionProvider`] backed by the OpenAI chat completions API.
///
/// Each call is a single-turn exchange: the prompt is sent as one user
/// message and the first choice's content is returned.
pub struct OpenAiCompletions {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiCompletions {
    /// Create a new provider with the given API key and model.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::InvalidConfiguration`] for an empty API key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(KbError::InvalidConfiguration(
                "completion API key must not be empty".to_string(),
            ));
        }
        Ok(Self { client: reqwest::Client::new(), api_key, model: model.into() })
    }

    /// Create a provider from a [`KbConfig`].
    pub fn from_config(config: &KbConfig) -> Result<Self> {
        Self::new(config.api_key.clone(), config.completion_model.clone())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl CompletionProvider for OpenAiCompletions {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(provider = "OpenAI", model = %self.model, prompt_len = prompt.len(), "completing prompt");

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: COMPLETION_TEMPERATURE,
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "completion request failed");
                KbError::Completion {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(provider = "OpenAI", %status, "completion API error");
            return Err(KbError::Completion {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse completion response");
            KbError::Completion {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        chat_response.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            KbError::Completion {
                provider: "OpenAI".into(),
                message: "API returned no choices".into(),
            }
        })
    }
}
