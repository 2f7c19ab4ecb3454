//! Anthropic Messages API backend.

use emotion_rules::ProviderId;
use serde::{Deserialize, Serialize};

use super::{non_empty, HttpTransport, ProviderSettings, ProviderStrategy, MAX_TOKENS, TEMPERATURE};
use crate::error::ProviderCallError;
use crate::response::prompt::Prompt;
use crate::response::GenerationRequest;

const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    endpoint: String,
    model: String,
    settings: ProviderSettings,
    transport: HttpTransport,
}

impl AnthropicProvider {
    pub fn new(settings: ProviderSettings, transport: HttpTransport) -> Self {
        Self {
            endpoint: settings.endpoint_or(ENDPOINT),
            model: settings.model_or(DEFAULT_MODEL),
            settings,
            transport,
        }
    }

    fn request_body(&self, prompt: &Prompt) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: prompt.system.clone(),
            messages: vec![Message {
                role: "user",
                content: prompt.user.clone(),
            }],
        }
    }
}

/// First text block of the reply.
fn extract_reply(response: MessagesResponse) -> Result<String, ProviderCallError> {
    let text = response
        .content
        .into_iter()
        .find(|block| block.kind == "text" || block.kind.is_empty())
        .and_then(|block| block.text)
        .ok_or_else(|| ProviderCallError::MalformedResponse("no text content in response".to_string()))?;
    non_empty(&text)
}

impl ProviderStrategy for AnthropicProvider {
    fn id(&self) -> &str {
        ProviderId::Anthropic.as_str()
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderCallError> {
        let key = self.settings.require_key(ProviderId::Anthropic)?;
        let prompt = Prompt::for_request(request);
        let headers = [
            ("x-api-key", key.to_string()),
            ("anthropic-version", API_VERSION.to_string()),
        ];

        tracing::debug!(target: "empath::provider", provider = "anthropic", model = %self.model, "Sending messages request");
        let reply: MessagesResponse =
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
    fn test_request_body_has_system_field() {
        let provider = AnthropicProvider::new(ProviderSettings::default(), fast_transport());
        let prompt = Prompt {
            system: "sys".to_string(),
            user: "hi".to_string(),
        };
        let body = serde_json::to_value(provider.request_body(&prompt)).unwrap();

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hi");
        assert_eq!(body["max_tokens"], 300);
    }

    #[test]
    fn test_extract_reply() {
        let reply: MessagesResponse =
            decode(r#"{"content":[{"type":"text","text":"That makes sense."}],"role":"assistant"}"#)
                .unwrap();
        assert_eq!(extract_reply(reply).unwrap(), "That makes sense.");

        let empty: MessagesResponse = decode(r#"{"content":[]}"#).unwrap();
        assert!(extract_reply(empty).is_err());
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let provider = AnthropicProvider::new(unreachable_settings(), fast_transport());
        let request = GenerationRequest::new("hi", EmotionScoreMap::new(), Vec::new());
        assert!(provider.generate(&request).is_err());
    }
}
