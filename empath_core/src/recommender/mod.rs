//! Recommender - ranks techniques for a combined emotion map.
//!
//! The ranking works as follows:
//! 1. **Selection**: Take up to three labels with the highest scores above 0.1
//! 2. **Fallback**: If none qualify, use `neutral` alone
//! 3. **Traversal**: Walk the edges of each selected emotion present in the graph
//! 4. **Scoring**: Each edge contributes `weight * emotion score` to its technique
//! 5. **Ranking**: Stable sort by accumulated score, truncate to the requested count

mod scores;

pub use scores::*;

use emotion_rules::EmotionScoreMap;

use crate::knowledge_base::{KnowledgeGraph, TechniqueId};

/// Configuration for the ranking algorithm.
#[derive(Debug, Clone)]
pub struct RecommendConfig {
    /// How many of the strongest emotions take part.
    pub max_top_emotions: usize,

    /// Scores must exceed this to take part.
    pub min_emotion_score: f32,

    /// Emotion used when nothing clears the threshold.
    pub fallback_emotion: String,

    /// Score used for a selected emotion that is missing from the input map.
    pub missing_score: f32,

    /// Number of techniques returned when the caller does not say.
    pub default_max_techniques: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            max_top_emotions: 3,
            min_emotion_score: 0.1,
            fallback_emotion: "neutral".to_string(),
            missing_score: 0.5,
            default_max_techniques: 3,
        }
    }
}

/// Ranks techniques against a knowledge graph.
#[derive(Debug, Clone)]
pub struct Recommender {
    config: RecommendConfig,
}

impl Recommender {
    pub fn new(config: RecommendConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(RecommendConfig::default())
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// The emotions that drive the recommendation, strongest first.
    ///
    /// The threshold is applied after taking the top entries, so a map whose
    /// third-best score is 0.05 yields at most two labels.
    pub fn top_emotions(&self, scores: &EmotionScoreMap) -> Vec<String> {
        let top: Vec<String> = scores
            .ranked()
            .into_iter()
            .take(self.config.max_top_emotions)
            .filter(|(_, score)| *score > self.config.min_emotion_score)
            .map(|(label, _)| label.to_string())
            .collect();

        if top.is_empty() {
            vec![self.config.fallback_emotion.clone()]
        } else {
            top
        }
    }

    /// Accumulate `edge weight * emotion score` per technique.
    pub fn score_techniques(
        &self,
        graph: &KnowledgeGraph,
        scores: &EmotionScoreMap,
    ) -> TechniqueScores {
        let mut technique_scores = TechniqueScores::new();

        for emotion in self.top_emotions(scores) {
            if !graph.has_emotion(&emotion) {
                tracing::trace!(target: "empath::recommender", emotion = %emotion, "Emotion not in graph");
                continue;
            }
            let emotion_score = scores.get(&emotion).unwrap_or(self.config.missing_score);
            for edge in graph.edges(&emotion) {
                technique_scores.add(&edge.technique, edge.weight * emotion_score);
            }
        }

        technique_scores
    }

    /// Ranked technique ids, at most `max_techniques` of them.
    pub fn recommend(
        &self,
        graph: &KnowledgeGraph,
        scores: &EmotionScoreMap,
        max_techniques: usize,
    ) -> Vec<TechniqueId> {
        let ranked = self.score_techniques(graph, scores).top(max_techniques);
        tracing::debug!(
            target: "empath::recommender",
            techniques = ?ranked,
            "Ranked techniques"
        );
        ranked
    }

    /// [`Recommender::recommend`] with the configured default count.
    pub fn recommend_default(
        &self,
        graph: &KnowledgeGraph,
        scores: &EmotionScoreMap,
    ) -> Vec<TechniqueId> {
        self.recommend(graph, scores, self.config.default_max_techniques)
    }
}
