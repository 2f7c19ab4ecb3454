//! Google Gemini `generateContent` backend.

use emotion_rules::ProviderId;
use serde::{Deserialize, Serialize};

use super::{non_empty, HttpTransport, ProviderSettings, ProviderStrategy, MAX_TOKENS, TEMPERATURE};
use crate::error::ProviderCallError;
use crate::response::prompt::Prompt;
use crate::response::GenerationRequest;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-pro";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    url: String,
    model: String,
    settings: ProviderSettings,
    transport: HttpTransport,
}

impl GeminiProvider {
    pub fn new(settings: ProviderSettings, transport: HttpTransport) -> Self {
        let model = settings.model_or(DEFAULT_MODEL);
        let url = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("{}/{}:generateContent", BASE_URL, model));
        Self {
            url,
            model,
            settings,
            transport,
        }
    }

    fn request_body(prompt: &Prompt) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.inline(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_TOKENS,
            },
        }
    }
}

fn extract_reply(response: GenerateContentResponse) -> Result<String, ProviderCallError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| ProviderCallError::MalformedResponse("no candidates in response".to_string()))?;
    non_empty(&text)
}

impl ProviderStrategy for GeminiProvider {
    fn id(&self) -> &str {
        ProviderId::Google.as_str()
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderCallError> {
        let key = self.settings.require_key(ProviderId::Google)?;
        let body = Self::request_body(&Prompt::for_request(request));
        let headers = [("x-goog-api-key", key.to_string())];

        tracing::debug!(target: "empath::provider", provider = "google", model = %self.model, "Sending generateContent request");
        let reply: GenerateContentResponse = self.transport.post_json(&self.url, &headers, &body)?;
        extract_reply(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::providers::decode;
    use crate::response::providers::tests::fast_transport;

    #[test]
    fn test_url_and_body() {
        let provider = GeminiProvider::new(ProviderSettings::default(), fast_transport());
        assert_eq!(
            provider.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );

        let prompt = Prompt {
            system: "sys".to_string(),
            user: "hi".to_string(),
        };
        let body = serde_json::to_value(GeminiProvider::request_body(&prompt)).unwrap();
        assert!(body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("'hi'"));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 300);
    }

    #[test]
    fn test_extract_reply() {
        let reply: GenerateContentResponse = decode(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"You are not alone."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_reply(reply).unwrap(), "You are not alone.");

        let blocked: GenerateContentResponse = decode(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(matches!(
            extract_reply(blocked),
            Err(ProviderCallError::MalformedResponse(_))
        ));
    }
}
