//! Together.ai completions backend, prompted in ChatML.

use emotion_rules::ProviderId;
use serde::{Deserialize, Serialize};

use super::{non_empty, HttpTransport, ProviderSettings, ProviderStrategy, MAX_TOKENS, TEMPERATURE};
use crate::error::ProviderCallError;
use crate::response::prompt::Prompt;
use crate::response::GenerationRequest;

const ENDPOINT: &str = "https://api.together.xyz/v1/completions";
const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
const STOP: &str = "<|im_end|>";

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    stop: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone)]
pub struct TogetherProvider {
    endpoint: String,
    model: String,
    settings: ProviderSettings,
    transport: HttpTransport,
}

impl TogetherProvider {
    pub fn new(settings: ProviderSettings, transport: HttpTransport) -> Self {
        Self {
            endpoint: settings.endpoint_or(ENDPOINT),
            model: settings.model_or(DEFAULT_MODEL),
            settings,
            transport,
        }
    }

    fn request_body(&self, prompt: &Prompt) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            prompt: prompt.chatml(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            stop: vec![STOP.to_string()],
        }
    }
}

fn extract_reply(response: CompletionResponse) -> Result<String, ProviderCallError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderCallError::MalformedResponse("no choices in response".to_string()))?;
    non_empty(&choice.text)
}

impl ProviderStrategy for TogetherProvider {
    fn id(&self) -> &str {
        ProviderId::TogetherAi.as_str()
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderCallError> {
        let key = self.settings.require_key(ProviderId::TogetherAi)?;
        let prompt = Prompt::for_request(request);
        let headers = [("Authorization", format!("Bearer {}", key))];

        tracing::debug!(target: "empath::provider", provider = "together_ai", model = %self.model, "Sending completion request");
        let reply: CompletionResponse =
            self.transport
                .post_json(&self.endpoint, &headers, &self.request_body(&prompt))?;
        extract_reply(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::providers::decode;
    use crate::response::providers::tests::fast_transport;

    #[test]
    fn test_request_uses_chatml_and_stop() {
        let provider = TogetherProvider::new(ProviderSettings::default(), fast_transport());
        let prompt = Prompt {
            system: "sys".to_string(),
            user: "hi".to_string(),
        };
        let body = serde_json::to_value(provider.request_body(&prompt)).unwrap();

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert!(body["prompt"]
            .as_str()
            .unwrap()
            .ends_with("<|im_start|>assistant\n"));
        assert_eq!(body["stop"][0], "<|im_end|>");
        assert_eq!(body["max_tokens"], 300);
    }

    #[test]
    fn test_extract_reply() {
        let reply: CompletionResponse = decode(r#"{"choices":[{"text":"\nThat sounds hard."}]}"#).unwrap();
        assert_eq!(extract_reply(reply).unwrap(), "That sounds hard.");

        let none: CompletionResponse = decode(r#"{}"#).unwrap();
        assert!(extract_reply(none).is_err());
    }
}
