//! Response generation: provider dispatch with template fallback.
//!
//! ```text
//! NotStarted -> ProviderSelected -> ProviderSucceeded -> Done
//!                                \-> ProviderFailed -> TemplateFallback -> Done
//! ```
//!
//! A request with no configured provider goes straight to the template
//! compositor. Each provider is tried at most once; there is no retry and no
//! failover between providers.

mod corpus;
pub mod prompt;
pub mod providers;
mod template;

pub use corpus::*;
pub use prompt::Prompt;
pub use providers::{ProviderRegistry, ProviderSettings, ProviderStrategy};
pub use template::*;

use emotion_rules::{EmotionScoreMap, ProviderConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::knowledge_base::TechniqueId;

/// Unique identifier for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Create a new random request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The unit of work handed to the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub id: RequestId,

    /// The user's message. May be empty at this layer.
    pub text: String,

    /// Combined emotion scores.
    pub emotions: EmotionScoreMap,

    /// Ranked technique ids, best first.
    pub techniques: Vec<TechniqueId>,

    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        text: impl Into<String>,
        emotions: EmotionScoreMap,
        techniques: Vec<TechniqueId>,
    ) -> Self {
        Self {
            id: RequestId::new(),
            text: text.into(),
            emotions,
            techniques,
            user_id: None,
            session_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Where a response came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "provider", rename_all = "snake_case")]
pub enum ResponseSource {
    /// Generated by the named provider.
    Provider(String),

    /// Composed from templates; no provider configured.
    Template,

    /// Composed from templates after the named provider failed or was unknown.
    TemplateFallback(String),

    /// Template composition failed; the fixed literal was returned.
    Literal,
}

impl ResponseSource {
    pub fn is_provider(&self) -> bool {
        matches!(self, ResponseSource::Provider(_))
    }
}

/// A response together with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedResponse {
    pub text: String,
    pub source: ResponseSource,
}

/// Selects a provider strategy by configured id and falls back to templates.
#[derive(Debug)]
pub struct ResponseDispatcher {
    config: ProviderConfig,
    registry: ProviderRegistry,
    compositor: TemplateCompositor,
}

impl ResponseDispatcher {
    /// Dispatcher over the built-in strategies and corpus.
    pub fn new(config: ProviderConfig) -> Self {
        let registry = ProviderRegistry::from_config(&config);
        Self::with_parts(config, registry, TemplateCompositor::with_defaults())
    }

    pub fn with_parts(
        config: ProviderConfig,
        registry: ProviderRegistry,
        compositor: TemplateCompositor,
    ) -> Self {
        Self {
            config,
            registry,
            compositor,
        }
    }

    /// Template-only dispatcher.
    pub fn template_only() -> Self {
        Self::with_parts(
            ProviderConfig::unconfigured(),
            ProviderRegistry::new(),
            TemplateCompositor::with_defaults(),
        )
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn compositor(&self) -> &TemplateCompositor {
        &self.compositor
    }

    /// Whether responses are expected to come from a provider.
    pub fn uses_provider(&self) -> bool {
        self.config
            .provider_id
            .as_deref()
            .map(|id| self.registry.contains(id))
            .unwrap_or(false)
    }

    /// Response text for a request. Never fails and never returns an empty string.
    pub fn generate(&self, request: &GenerationRequest) -> String {
        self.dispatch(request).text
    }

    pub fn dispatch(&self, request: &GenerationRequest) -> GeneratedResponse {
        self.dispatch_with(&mut rand::thread_rng(), request)
    }

    /// Dispatch with an injected random source for template selection.
    pub fn dispatch_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &GenerationRequest,
    ) -> GeneratedResponse {
        let Some(provider_id) = self.config.provider_id.as_deref() else {
            tracing::debug!(target: "empath::dispatch", request = %request.id, "No provider configured; using templates");
            return self.from_templates(rng, request, ResponseSource::Template);
        };

        let Some(strategy) = self.registry.get(provider_id) else {
            tracing::warn!(
                target: "empath::dispatch",
                request = %request.id,
                provider = provider_id,
                "Unknown LLM provider; falling back to templates"
            );
            return self.from_templates(
                rng,
                request,
                ResponseSource::TemplateFallback(provider_id.to_string()),
            );
        };

        tracing::debug!(target: "empath::dispatch", request = %request.id, provider = strategy.id(), "Provider selected");
        match strategy.generate(request) {
            Ok(text) if !text.trim().is_empty() => {
                tracing::info!(target: "empath::dispatch", request = %request.id, provider = strategy.id(), "Provider response generated");
                GeneratedResponse {
                    text,
                    source: ResponseSource::Provider(strategy.id().to_string()),
                }
            }
            Ok(_) => {
                tracing::warn!(target: "empath::dispatch", request = %request.id, provider = strategy.id(), "Provider returned empty text; using templates");
                self.from_templates(
                    rng,
                    request,
                    ResponseSource::TemplateFallback(strategy.id().to_string()),
                )
            }
            Err(e) => {
                tracing::warn!(
                    target: "empath::dispatch",
                    request = %request.id,
                    provider = strategy.id(),
                    error = %e,
                    "Provider failed; using templates"
                );
                self.from_templates(
                    rng,
                    request,
                    ResponseSource::TemplateFallback(strategy.id().to_string()),
                )
            }
        }
    }

    fn from_templates<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &GenerationRequest,
        source: ResponseSource,
    ) -> GeneratedResponse {
        match self
            .compositor
            .try_compose_with(rng, &request.emotions, &request.techniques)
        {
            Ok(text) => GeneratedResponse { text, source },
            Err(e) => {
                tracing::error!(target: "empath::dispatch", request = %request.id, error = %e, "Template composition failed");
                GeneratedResponse {
                    text: LITERAL_FALLBACK.to_string(),
                    source: ResponseSource::Literal,
                }
            }
        }
    }
}

impl Default for ResponseDispatcher {
    fn default() -> Self {
        Self::template_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderCallError;
    use rand::rngs::mock::StepRng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        id: &'static str,
        reply: fn() -> Result<String, ProviderCallError>,
        calls: Arc<AtomicUsize>,
    }

    impl ProviderStrategy for Scripted {
        fn id(&self) -> &str {
            self.id
        }

        fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderCallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    fn dispatcher_with(
        provider: Option<&str>,
        reply: fn() -> Result<String, ProviderCallError>,
    ) -> (ResponseDispatcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(Scripted {
            id: "scripted",
            reply,
            calls: calls.clone(),
        }));
        let config = match provider {
            Some(id) => ProviderConfig::for_provider(id, None),
            None => ProviderConfig::unconfigured(),
        };
        (
            ResponseDispatcher::with_parts(config, registry, TemplateCompositor::with_defaults()),
            calls,
        )
    }

    fn sad_request() -> GenerationRequest {
        GenerationRequest::new(
            "I miss my dog",
            EmotionScoreMap::new().with("sadness", 0.9),
            vec![TechniqueId::from("social_connection")],
        )
        .with_user("u-1")
        .with_session("s-1")
    }

    #[test]
    fn test_request_builders() {
        let request = sad_request();
        assert_eq!(request.user_id.as_deref(), Some("u-1"));
        assert_eq!(request.session_id.as_deref(), Some("s-1"));
        assert_ne!(request.id, GenerationRequest::new("", EmotionScoreMap::new(), vec![]).id);
    }

    #[test]
    fn test_no_provider_uses_templates() {
        let (dispatcher, calls) = dispatcher_with(None, || Ok("unused".to_string()));
        let response = dispatcher.dispatch_with(&mut StepRng::new(0, 0), &sad_request());

        assert_eq!(response.source, ResponseSource::Template);
        assert!(response
            .text
            .starts_with("I notice you seem to be feeling down right now."));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!dispatcher.uses_provider());
    }

    #[test]
    fn test_provider_success() {
        let (dispatcher, calls) = dispatcher_with(Some("scripted"), || {
            Ok("That loss sounds painful.".to_string())
        });
        let response = dispatcher.dispatch(&sad_request());

        assert_eq!(response.text, "That loss sounds painful.");
        assert_eq!(response.source, ResponseSource::Provider("scripted".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(dispatcher.uses_provider());
    }

    #[test]
    fn test_provider_failure_falls_back_once() {
        let (dispatcher, calls) = dispatcher_with(Some("Scripted"), || {
            Err(ProviderCallError::Status {
                status: 401,
                body: "unauthorized".to_string(),
            })
        });
        let response = dispatcher.dispatch_with(&mut StepRng::new(0, 0), &sad_request());

        assert_eq!(
            response.source,
            ResponseSource::TemplateFallback("scripted".to_string())
        );
        assert!(response.text.contains("Social Connection"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_provider_text_falls_back() {
        let (dispatcher, _) = dispatcher_with(Some("scripted"), || Ok("   ".to_string()));
        let response = dispatcher.dispatch(&sad_request());

        assert!(matches!(response.source, ResponseSource::TemplateFallback(_)));
        assert!(!response.text.trim().is_empty());
    }

    #[test]
    fn test_unknown_provider_falls_back() {
        let (dispatcher, calls) = dispatcher_with(Some("mistral"), || Ok("unused".to_string()));
        let response = dispatcher.dispatch(&sad_request());

        assert_eq!(
            response.source,
            ResponseSource::TemplateFallback("mistral".to_string())
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!dispatcher.uses_provider());

        let unconfigured = ResponseDispatcher::template_only();
        let fallback = dispatcher.dispatch_with(&mut StepRng::new(0, 0), &sad_request());
        let template = unconfigured.dispatch_with(&mut StepRng::new(0, 0), &sad_request());
        assert_eq!(fallback.text, template.text);
    }

    #[test]
    fn test_broken_corpus_returns_literal() {
        let mut corpus = TemplateCorpus::builtin();
        corpus.greeting.clear();
        let dispatcher = ResponseDispatcher::with_parts(
            ProviderConfig::unconfigured(),
            ProviderRegistry::new(),
            TemplateCompositor::new(corpus),
        );

        let response = dispatcher.dispatch(&sad_request());
        assert_eq!(response.source, ResponseSource::Literal);
        assert_eq!(dispatcher.generate(&sad_request()), LITERAL_FALLBACK);
    }

    #[test]
    fn test_missing_key_with_builtin_registry_falls_back() {
        let dispatcher = ResponseDispatcher::new(ProviderConfig::for_provider("openai", None));
        let response = dispatcher.dispatch(&sad_request());

        assert_eq!(
            response.source,
            ResponseSource::TemplateFallback("openai".to_string())
        );
        assert!(!response.text.is_empty());
    }

    #[test]
    fn test_unreachable_provider_falls_back() {
        let config = ProviderConfig::for_provider("deepseek", Some("k".to_string()))
            .with_endpoint("http://127.0.0.1:9/v1/chat/completions")
            .with_timeout(std::time::Duration::from_secs(2));
        let dispatcher = ResponseDispatcher::new(config);

        let text = dispatcher.generate(&sad_request());
        assert!(!text.is_empty());
        assert_ne!(text, LITERAL_FALLBACK);
    }

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&ResponseSource::Provider("openai".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"provider","provider":"openai"}"#);
        assert_eq!(
            serde_json::to_string(&ResponseSource::Template).unwrap(),
            r#"{"kind":"template"}"#
        );
    }
}
