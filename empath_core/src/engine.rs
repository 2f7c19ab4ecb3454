//! Engine facade - the full analyze-to-reply pipeline over one shared graph.
//!
//! The graph sits behind a reader/writer lock: recommendations take the read
//! side, `load_graph` takes the write side for the duration of the swap.

use emotion_rules::{EmotionScoreMap, FusionPolicy, ProviderConfig, ProviderId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::InputValidationError;
use crate::knowledge_base::{KnowledgeGraph, TechniqueId, TechniqueRecord};
use crate::recommender::Recommender;
use crate::response::{GenerationRequest, ResponseDispatcher, ResponseSource};

/// Caller identity attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

impl RequestContext {
    pub fn new(user_id: Option<String>, session_id: Option<String>) -> Self {
        Self {
            user_id,
            session_id,
        }
    }

    fn apply(&self, mut request: GenerationRequest) -> GenerationRequest {
        request.user_id = self.user_id.clone();
        request.session_id = self.session_id.clone();
        request
    }
}

/// What a caller gets back for one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineReply {
    pub detected_emotions: EmotionScoreMap,
    pub techniques: Vec<TechniqueId>,
    pub response_text: String,
    pub source: ResponseSource,
}

/// Which backend is answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub current_provider: Option<String>,
    pub current_model: Option<String>,
    pub available_providers: Vec<(String, String)>,
    pub is_using_llm: bool,
}

pub struct EmpathEngine {
    graph: RwLock<KnowledgeGraph>,
    recommender: Recommender,
    dispatcher: ResponseDispatcher,
}

impl EmpathEngine {
    pub fn new(graph: KnowledgeGraph, dispatcher: ResponseDispatcher) -> Self {
        Self {
            graph: RwLock::new(graph),
            recommender: Recommender::with_defaults(),
            dispatcher,
        }
    }

    /// Default graph, template-only responses.
    pub fn with_defaults() -> Self {
        Self::new(KnowledgeGraph::build_default(), ResponseDispatcher::template_only())
    }

    /// Default graph, responses from the configured provider.
    pub fn from_config(config: ProviderConfig) -> Self {
        Self::new(
            KnowledgeGraph::build_default(),
            ResponseDispatcher::new(config),
        )
    }

    pub fn with_recommender(mut self, recommender: Recommender) -> Self {
        self.recommender = recommender;
        self
    }

    pub fn dispatcher(&self) -> &ResponseDispatcher {
        &self.dispatcher
    }

    fn read_graph(&self) -> RwLockReadGuard<'_, KnowledgeGraph> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_graph(&self) -> RwLockWriteGuard<'_, KnowledgeGraph> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ranked technique ids for a score map.
    pub fn recommend(&self, emotions: &EmotionScoreMap, max_techniques: usize) -> Vec<TechniqueId> {
        self.recommender
            .recommend(&self.read_graph(), emotions, max_techniques)
    }

    pub fn technique_details(&self, id: &str) -> Option<TechniqueRecord> {
        self.read_graph().technique_details(id)
    }

    /// Response text for a prepared request. Never fails.
    pub fn generate(&self, request: &GenerationRequest) -> String {
        self.dispatcher.generate(request)
    }

    /// Recommend from this engine's graph, then generate.
    pub fn generate_without_techniques(
        &self,
        text: &str,
        emotions: &EmotionScoreMap,
        context: &RequestContext,
    ) -> String {
        self.reply(text, emotions.clone(), context).response_text
    }

    /// Reply to a text message with its analyzed emotions.
    pub fn respond_text(
        &self,
        text: &str,
        emotions: &EmotionScoreMap,
        context: &RequestContext,
    ) -> Result<EngineReply, InputValidationError> {
        validate_text(text)?;
        Ok(self.reply(text, emotions.clone(), context))
    }

    /// Reply to a text message with optional audio evidence.
    ///
    /// Audio scores are fused in with [`FusionPolicy::AdditiveOverwrite`].
    pub fn respond_multimodal(
        &self,
        text: &str,
        text_emotions: &EmotionScoreMap,
        audio_emotions: Option<&EmotionScoreMap>,
        context: &RequestContext,
    ) -> Result<EngineReply, InputValidationError> {
        validate_text(text)?;
        let combined = match audio_emotions {
            Some(audio) => FusionPolicy::AdditiveOverwrite.fuse(text_emotions, audio),
            None => text_emotions.clone(),
        };
        Ok(self.reply(text, combined, context))
    }

    /// Reply to an audio message. A transcript is optional; when text scores
    /// are present they are fused with [`FusionPolicy::UnionSymmetric`].
    pub fn respond_audio(
        &self,
        audio_emotions: &EmotionScoreMap,
        text: Option<&str>,
        text_emotions: Option<&EmotionScoreMap>,
        context: &RequestContext,
    ) -> EngineReply {
        let combined = match text_emotions {
            Some(text_emotions) if !text_emotions.is_empty() => {
                FusionPolicy::UnionSymmetric.fuse(text_emotions, audio_emotions)
            }
            _ => audio_emotions.clone(),
        };
        self.reply(text.unwrap_or_default(), combined, context)
    }

    fn reply(&self, text: &str, emotions: EmotionScoreMap, context: &RequestContext) -> EngineReply {
        let techniques = self.recommender.recommend_default(&self.read_graph(), &emotions);
        let request = context.apply(GenerationRequest::new(text, emotions, techniques));
        let response = self.dispatcher.dispatch(&request);

        tracing::info!(
            target: "empath::engine",
            request = %request.id,
            techniques = request.techniques.len(),
            source = ?response.source,
            "Reply generated"
        );

        EngineReply {
            detected_emotions: request.emotions,
            techniques: request.techniques,
            response_text: response.text,
            source: response.source,
        }
    }

    /// Replace the graph from a snapshot file. A bad file yields the default graph.
    pub fn load_graph(&self, path: impl AsRef<Path>) {
        let graph = KnowledgeGraph::load(path);
        *self.write_graph() = graph;
    }

    /// Persist the current graph. Returns false on failure.
    pub fn save_graph(&self, path: impl AsRef<Path>) -> bool {
        self.read_graph().save(path)
    }

    pub fn provider_status(&self) -> ProviderStatus {
        let config = self.dispatcher.config();
        ProviderStatus {
            current_provider: config.provider_id.clone(),
            current_model: config.model_id.clone(),
            available_providers: ProviderId::available()
                .into_iter()
                .map(|(id, description)| (id.to_string(), description.to_string()))
                .collect(),
            is_using_llm: self.dispatcher.uses_provider(),
        }
    }
}

impl Default for EmpathEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn validate_text(text: &str) -> Result<(), InputValidationError> {
    if text.trim().is_empty() {
        Err(InputValidationError::MissingText)
    } else {
        Ok(())
    }
}
