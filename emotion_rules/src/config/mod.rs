//! Provider configuration: which external text-generation backend to use, and how.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | LLM_PROVIDER | unset | Provider id (`openai`, `ollama`, ...). Unset => template responses only. |
//! | LLM_MODEL | provider default | Model identifier passed to the provider. |
//! | `<PROVIDER_ID>_API_KEY` | unset | e.g. `OPENROUTER_API_KEY`, `TOGETHER_AI_API_KEY`. |
//! | LLM_TIMEOUT_SECS | 30 | Per-call timeout. |
//! | LLM_ENDPOINT / OLLAMA_API_URL | provider default | Endpoint override. |

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const ENV_PROVIDER: &str = "LLM_PROVIDER";
const ENV_MODEL: &str = "LLM_MODEL";
const ENV_TIMEOUT: &str = "LLM_TIMEOUT_SECS";
const ENV_ENDPOINT: &str = "LLM_ENDPOINT";
const ENV_OLLAMA_URL: &str = "OLLAMA_API_URL";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The closed set of known providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    OpenAi,
    HuggingFace,
    Ollama,
    TogetherAi,
    Google,
    Anthropic,
    Deepseek,
    OpenRouter,
}

impl ProviderId {
    pub const ALL: [ProviderId; 8] = [
        ProviderId::OpenAi,
        ProviderId::HuggingFace,
        ProviderId::Ollama,
        ProviderId::TogetherAi,
        ProviderId::Google,
        ProviderId::Anthropic,
        ProviderId::Deepseek,
        ProviderId::OpenRouter,
    ];

    /// Parse a configured id. Unknown ids yield `None`.
    pub fn parse(id: &str) -> Option<Self> {
        let id = id.trim().to_lowercase();
        Self::ALL.iter().copied().find(|p| p.as_str() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::HuggingFace => "huggingface",
            ProviderId::Ollama => "ollama",
            ProviderId::TogetherAi => "together_ai",
            ProviderId::Google => "google",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Deepseek => "deepseek",
            ProviderId::OpenRouter => "openrouter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "OpenAI API (requires key)",
            ProviderId::HuggingFace => "HuggingFace Inference API (free tier available)",
            ProviderId::Ollama => "Ollama (local deployment)",
            ProviderId::TogetherAi => "Together.ai (free tier available)",
            ProviderId::Google => "Google Gemini API (free tier available)",
            ProviderId::Anthropic => "Anthropic Claude (requires key)",
            ProviderId::Deepseek => "Deepseek API (requires key)",
            ProviderId::OpenRouter => "OpenRouter API (access to multiple models)",
        }
    }

    /// Whether calls to this provider need an API key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderId::Ollama)
    }

    /// All known providers with their descriptions.
    pub fn available() -> Vec<(&'static str, &'static str)> {
        Self::ALL.iter().map(|p| (p.as_str(), p.description())).collect()
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the environment variable holding the key for a provider id.
pub fn api_key_var(provider_id: &str) -> String {
    format!("{}_API_KEY", provider_id.trim().to_uppercase())
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Process-wide provider configuration.
///
/// The provider id is kept as the raw configured string so that an
/// unrecognized id is still visible to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider_id: Option<String>,

    #[serde(default)]
    pub model_id: Option<String>,

    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Overrides the provider's default endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_id: None,
            model_id: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoint: None,
        }
    }
}

impl ProviderConfig {
    /// No provider: every response comes from the template compositor.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Configuration for a provider id with an optional key.
    pub fn for_provider(provider_id: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            provider_id: Some(provider_id.into()),
            api_key,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider_id = get(ENV_PROVIDER);
        let api_key = provider_id.as_deref().and_then(|id| get(&api_key_var(id)));
        let timeout_secs = get(ENV_TIMEOUT)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let endpoint = get(ENV_ENDPOINT).or_else(|| {
            match provider_id.as_deref().and_then(ProviderId::parse) {
                Some(ProviderId::Ollama) => get(ENV_OLLAMA_URL),
                _ => None,
            }
        });

        Self {
            provider_id,
            model_id: get(ENV_MODEL),
            api_key,
            timeout_secs,
            endpoint,
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: ProviderConfig = toml::from_str(contents)?;
        config.provider_id = config
            .provider_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if config.timeout_secs == 0 {
            config.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        Ok(config)
    }

    /// Load a TOML file. A missing `api_key` is filled from the environment convention.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_toml_str(&contents)?;
        if config.api_key.is_none() {
            if let Some(id) = config.provider_id.as_deref() {
                config.api_key = std::env::var(api_key_var(id))
                    .ok()
                    .filter(|k| !k.trim().is_empty());
            }
        }
        tracing::debug!(
            target: "empath::config",
            path = %path.as_ref().display(),
            provider = ?config.provider_id,
            "Loaded provider configuration"
        );
        Ok(config)
    }

    /// Whether a provider id is set at all (known or not).
    pub fn is_configured(&self) -> bool {
        self.provider_id.is_some()
    }

    /// The configured provider, if it is one of the known ids.
    pub fn known_provider(&self) -> Option<ProviderId> {
        self.provider_id.as_deref().and_then(ProviderId::parse)
    }

    /// Per-call timeout. A zero value means the default.
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }
}
