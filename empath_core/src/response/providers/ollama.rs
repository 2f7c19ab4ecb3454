//! Local Ollama backend. Needs no API key.

use emotion_rules::ProviderId;
use serde::{Deserialize, Serialize};

use super::{non_empty, HttpTransport, ProviderSettings, ProviderStrategy};
use crate::error::ProviderCallError;
use crate::response::prompt::Prompt;
use crate::response::GenerationRequest;

const ENDPOINT: &str = "http://localhost:11434/api/generate";
const DEFAULT_MODEL: &str = "llama2";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    transport: HttpTransport,
}

impl OllamaProvider {
    pub fn new(settings: ProviderSettings, transport: HttpTransport) -> Self {
        Self {
            endpoint: settings.endpoint_or(ENDPOINT),
            model: settings.model_or(DEFAULT_MODEL),
            transport,
        }
    }
}

impl ProviderStrategy for OllamaProvider {
    fn id(&self) -> &str {
        ProviderId::Ollama.as_str()
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderCallError> {
        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: Prompt::for_request(request).inline(),
            stream: false,
        };

        tracing::debug!(target: "empath::provider", provider = "ollama", model = %self.model, endpoint = %self.endpoint, "Sending generate request");
        let reply: GenerateResponse = self.transport.post_json(&self.endpoint, &[], &body)?;
        non_empty(&reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::providers::tests::{fast_transport, UNREACHABLE};
    use crate::response::providers::decode;
    use emotion_rules::EmotionScoreMap;

    #[test]
    fn test_defaults() {
        let provider = OllamaProvider::new(ProviderSettings::default(), fast_transport());
        assert_eq!(provider.endpoint, ENDPOINT);
        assert_eq!(provider.model, "llama2");
    }

    #[test]
    fn test_reply_decoding() {
        let reply: GenerateResponse = decode(r#"{"model":"llama2","response":" Breathe. ","done":true}"#).unwrap();
        assert_eq!(non_empty(&reply.response).unwrap(), "Breathe.");
    }

    #[test]
    fn test_no_key_needed_but_unreachable_fails() {
        let settings = ProviderSettings {
            endpoint: Some(UNREACHABLE.to_string()),
            ..Default::default()
        };
        let provider = OllamaProvider::new(settings, fast_transport());
        let request = GenerationRequest::new("hi", EmotionScoreMap::new(), Vec::new());

        assert!(matches!(
            provider.generate(&request),
            Err(ProviderCallError::Transport(_))
        ));
    }
}
