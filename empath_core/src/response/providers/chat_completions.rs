//! OpenAI-compatible `/chat/completions` backends: OpenAI, Deepseek, OpenRouter.

use emotion_rules::ProviderId;
use serde::{Deserialize, Serialize};

use super::{non_empty, HttpTransport, ProviderSettings, ProviderStrategy, MAX_TOKENS, TEMPERATURE};
use crate::error::ProviderCallError;
use crate::response::prompt::Prompt;
use crate::response::GenerationRequest;

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-3.5-turbo";

const DEEPSEEK_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";
const DEEPSEEK_MODEL: &str = "deepseek-chat";

const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const OPENROUTER_MODEL: &str = "deepseek/deepseek-chat:free";
const OPENROUTER_REFERER: &str = "https://github.com/empath-engine/empath";
const OPENROUTER_TITLE: &str = "Empath";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// A chat-completions backend. The three supported services differ only in
/// endpoint, default model, and (for OpenRouter) attribution headers.
#[derive(Debug, Clone)]
pub struct ChatCompletionsProvider {
    provider: ProviderId,
    endpoint: String,
    model: String,
    settings: ProviderSettings,
    transport: HttpTransport,
    extra_headers: Vec<(&'static str, String)>,
}

impl ChatCompletionsProvider {
    fn build(
        provider: ProviderId,
        endpoint: &str,
        model: &str,
        settings: ProviderSettings,
        transport: HttpTransport,
    ) -> Self {
        Self {
            provider,
            endpoint: settings.endpoint_or(endpoint),
            model: settings.model_or(model),
            settings,
            transport,
            extra_headers: Vec::new(),
        }
    }

    pub fn openai(settings: ProviderSettings, transport: HttpTransport) -> Self {
        Self::build(ProviderId::OpenAi, OPENAI_ENDPOINT, OPENAI_MODEL, settings, transport)
    }

    pub fn deepseek(settings: ProviderSettings, transport: HttpTransport) -> Self {
        Self::build(
            ProviderId::Deepseek,
            DEEPSEEK_ENDPOINT,
            DEEPSEEK_MODEL,
            settings,
            transport,
        )
    }

    pub fn openrouter(settings: ProviderSettings, transport: HttpTransport) -> Self {
        let mut provider = Self::build(
            ProviderId::OpenRouter,
            OPENROUTER_ENDPOINT,
            OPENROUTER_MODEL,
            settings,
            transport,
        );
        provider.extra_headers = vec![
            ("HTTP-Referer", OPENROUTER_REFERER.to_string()),
            ("X-Title", OPENROUTER_TITLE.to_string()),
        ];
        provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, prompt: &Prompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

fn extract_reply(response: ChatResponse) -> Result<String, ProviderCallError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderCallError::MalformedResponse("no choices in response".to_string()))?
        .message
        .content
        .unwrap_or_default();
    non_empty(&content)
}

impl ProviderStrategy for ChatCompletionsProvider {
    fn id(&self) -> &str {
        self.provider.as_str()
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderCallError> {
        let key = self.settings.require_key(self.provider)?;
        let prompt = Prompt::for_request(request);

        let mut headers = vec![("Authorization", format!("Bearer {}", key))];
        headers.extend(self.extra_headers.iter().cloned());

        tracing::debug!(
            target: "empath::provider",
            provider = self.provider.as_str(),
            model = %self.model,
            "Sending chat completion request"
        );
        let reply: ChatResponse =
            self.transport
                .post_json(&self.endpoint, &headers, &self.request_body(&prompt))?;
        extract_reply(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::providers::decode;
    use crate::response::providers::tests::{fast_transport, unreachable_settings};
    use emotion_rules::EmotionScoreMap;

    #[test]
    fn test_defaults_per_service() {
        let openai = ChatCompletionsProvider::openai(ProviderSettings::default(), fast_transport());
        assert_eq!(openai.id(), "openai");
        assert_eq!(openai.model(), "gpt-3.5-turbo");
        assert_eq!(openai.endpoint(), OPENAI_ENDPOINT);

        let deepseek =
            ChatCompletionsProvider::deepseek(ProviderSettings::default(), fast_transport());
        assert_eq!(deepseek.model(), "deepseek-chat");

        let openrouter =
            ChatCompletionsProvider::openrouter(ProviderSettings::default(), fast_transport());
        assert_eq!(openrouter.model(), "deepseek/deepseek-chat:free");
        assert_eq!(openrouter.extra_headers.len(), 2);
    }

    #[test]
    fn test_model_override() {
        let settings = ProviderSettings {
            model: Some("gpt-4o-mini".to_string()),
            ..Default::default()
        };
        let provider = ChatCompletionsProvider::openai(settings, fast_transport());
        assert_eq!(provider.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_request_body_shape() {
        let provider = ChatCompletionsProvider::openai(ProviderSettings::default(), fast_transport());
        let prompt = Prompt {
            system: "be kind".to_string(),
            user: "hi".to_string(),
        };
        let body = serde_json::to_value(provider.request_body(&prompt)).unwrap();

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be kind");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["max_tokens"], 300);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_extract_reply() {
        let reply: ChatResponse =
            decode(r#"{"choices":[{"message":{"role":"assistant","content":"  I hear you. "}}]}"#)
                .unwrap();
        assert_eq!(extract_reply(reply).unwrap(), "I hear you.");

        let empty: ChatResponse = decode(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_reply(empty),
            Err(ProviderCallError::MalformedResponse(_))
        ));

        let blank: ChatResponse = decode(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(extract_reply(blank), Err(ProviderCallError::EmptyCompletion)));
    }

    #[test]
    fn test_missing_key_fails_before_network() {
        let provider = ChatCompletionsProvider::openai(ProviderSettings::default(), fast_transport());
        let request = GenerationRequest::new("hello", EmotionScoreMap::new(), Vec::new());

        assert!(matches!(
            provider.generate(&request),
            Err(ProviderCallError::MissingApiKey(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let provider = ChatCompletionsProvider::openrouter(unreachable_settings(), fast_transport());
        let request = GenerationRequest::new("hello", EmotionScoreMap::new(), Vec::new());

        assert!(matches!(
            provider.generate(&request),
            Err(ProviderCallError::Transport(_))
        ));
    }
}
