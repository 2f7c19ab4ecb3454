//! HuggingFace Inference API backend.

use emotion_rules::ProviderId;
use serde::{Deserialize, Serialize};

use super::{non_empty, HttpTransport, ProviderSettings, ProviderStrategy, MAX_TOKENS, TEMPERATURE};
use crate::error::ProviderCallError;
use crate::response::prompt::Prompt;
use crate::response::GenerationRequest;

const BASE_URL: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

#[derive(Debug, Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_length: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct Generated {
    #[serde(default)]
    generated_text: String,
}

/// The API answers with either a list of generations or a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    List(Vec<Generated>),
    Error { error: String },
    Single(Generated),
}

#[derive(Debug, Clone)]
pub struct HuggingFaceProvider {
    url: String,
    model: String,
    settings: ProviderSettings,
    transport: HttpTransport,
}

impl HuggingFaceProvider {
    pub fn new(settings: ProviderSettings, transport: HttpTransport) -> Self {
        let model = settings.model_or(DEFAULT_MODEL);
        let url = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("{}/{}", BASE_URL, model));
        Self {
            url,
            model,
            settings,
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Pull the generation out of a reply, dropping any echo of the prompt.
fn extract_reply(response: InferenceResponse, prompt: &str) -> Result<String, ProviderCallError> {
    let generated = match response {
        InferenceResponse::List(list) => list
            .into_iter()
            .next()
            .ok_or_else(|| ProviderCallError::MalformedResponse("empty generation list".to_string()))?
            .generated_text,
        InferenceResponse::Single(single) => single.generated_text,
        InferenceResponse::Error { error } => {
            return Err(ProviderCallError::MalformedResponse(error));
        }
    };

    non_empty(&generated.replace(prompt, ""))
}

impl ProviderStrategy for HuggingFaceProvider {
    fn id(&self) -> &str {
        ProviderId::HuggingFace.as_str()
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderCallError> {
        let key = self.settings.require_key(ProviderId::HuggingFace)?;
        let prompt = Prompt::for_request(request).inline();
        let body = InferenceRequest {
            inputs: prompt.clone(),
            parameters: InferenceParameters {
                max_length: MAX_TOKENS,
                temperature: TEMPERATURE,
            },
        };
        let headers = [("Authorization", format!("Bearer {}", key))];

        tracing::debug!(target: "empath::provider", provider = "huggingface", model = %self.model, "Sending inference request");
        let reply: InferenceResponse = self.transport.post_json(&self.url, &headers, &body)?;
        extract_reply(reply, &prompt)
    }
}
