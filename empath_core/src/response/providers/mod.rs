//! Provider strategies: pluggable external text-generation backends.
//!
//! Every strategy implements [`ProviderStrategy`] and is looked up by id in a
//! [`ProviderRegistry`]. Adding a backend means registering one more strategy.
//! Strategies make exactly one blocking HTTP call per request and report any
//! failure as a [`ProviderCallError`]; the dispatcher turns that into a
//! template fallback.

mod anthropic;
mod chat_completions;
mod gemini;
mod huggingface;
mod ollama;
mod together;

pub use anthropic::AnthropicProvider;
pub use chat_completions::ChatCompletionsProvider;
pub use gemini::GeminiProvider;
pub use huggingface::HuggingFaceProvider;
pub use ollama::OllamaProvider;
pub use together::TogetherProvider;

use emotion_rules::{ProviderConfig, ProviderId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use super::GenerationRequest;
use crate::error::ProviderCallError;

/// Sampling temperature sent to every backend.
pub const TEMPERATURE: f32 = 0.7;

/// Completion length cap sent to every backend.
pub const MAX_TOKENS: u32 = 300;

/// A text-generation backend.
pub trait ProviderStrategy: Send + Sync {
    /// Registry key, e.g. `openrouter`.
    fn id(&self) -> &str;

    /// Produce a reply for the request. Called at most once per request.
    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderCallError>;
}

/// Per-provider settings resolved from [`ProviderConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

impl ProviderSettings {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            model: config.model_id.clone(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    pub fn model_or(&self, default: &str) -> String {
        self.model.clone().unwrap_or_else(|| default.to_string())
    }

    pub fn endpoint_or(&self, default: &str) -> String {
        self.endpoint.clone().unwrap_or_else(|| default.to_string())
    }

    /// The API key, or `MissingApiKey` when none is configured.
    pub fn require_key(&self, provider: ProviderId) -> Result<&str, ProviderCallError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderCallError::MissingApiKey(provider.to_string()))
    }
}

/// Blocking JSON-over-HTTP client shared by the strategies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a client whose every call is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self::from_built(reqwest::blocking::Client::builder().timeout(timeout).build())
    }

    /// Use a built client, or the default client when building failed.
    fn from_built(built: reqwest::Result<reqwest::blocking::Client>) -> Self {
        let client = built.unwrap_or_else(|e| {
            tracing::warn!(
                target: "empath::provider",
                error = %e,
                "Failed to build HTTP client with timeout; using default client"
            );
            reqwest::blocking::Client::new()
        });
        Self { client }
    }

    /// POST a JSON body and decode a JSON reply.
    pub fn post_json<B, T>(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &B,
    ) -> Result<T, ProviderCallError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderCallError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text()?;
        decode(&text)
    }
}

/// Decode a provider reply body.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ProviderCallError> {
    serde_json::from_str(body).map_err(|e| ProviderCallError::MalformedResponse(e.to_string()))
}

/// Trim a completion, rejecting empty output.
pub(crate) fn non_empty(text: &str) -> Result<String, ProviderCallError> {
    let text = text.trim();
    if text.is_empty() {
        Err(ProviderCallError::EmptyCompletion)
    } else {
        Ok(text.to_string())
    }
}

/// Provider id -> strategy.
#[derive(Default)]
pub struct ProviderRegistry {
    strategies: HashMap<String, Box<dyn ProviderStrategy>>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding one strategy per known provider, all sharing the
    /// configured model, key, endpoint, and timeout.
    pub fn from_config(config: &ProviderConfig) -> Self {
        let settings = ProviderSettings::from_config(config);
        let transport = HttpTransport::new(config.timeout());
        let mut registry = Self::new();

        for provider in ProviderId::ALL {
            let settings = settings.clone();
            let transport = transport.clone();
            let strategy: Box<dyn ProviderStrategy> = match provider {
                ProviderId::OpenAi => Box::new(ChatCompletionsProvider::openai(settings, transport)),
                ProviderId::Deepseek => {
                    Box::new(ChatCompletionsProvider::deepseek(settings, transport))
                }
                ProviderId::OpenRouter => {
                    Box::new(ChatCompletionsProvider::openrouter(settings, transport))
                }
                ProviderId::TogetherAi => Box::new(TogetherProvider::new(settings, transport)),
                ProviderId::HuggingFace => Box::new(HuggingFaceProvider::new(settings, transport)),
                ProviderId::Ollama => Box::new(OllamaProvider::new(settings, transport)),
                ProviderId::Google => Box::new(GeminiProvider::new(settings, transport)),
                ProviderId::Anthropic => Box::new(AnthropicProvider::new(settings, transport)),
            };
            registry.register(strategy);
        }

        registry
    }

    /// Add or replace a strategy under its own id.
    pub fn register(&mut self, strategy: Box<dyn ProviderStrategy>) {
        self.strategies.insert(normalize(strategy.id()), strategy);
    }

    /// Look up a strategy. Ids are matched case-insensitively.
    pub fn get(&self, id: &str) -> Option<&dyn ProviderStrategy> {
        self.strategies.get(&normalize(id)).map(|s| s.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.strategies.contains_key(&normalize(id))
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.strategies.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("strategies", &self.ids())
            .finish()
    }
}

fn normalize(id: &str) -> String {
    id.trim().to_lowercase()
}
