//! Technique records - the payload of technique vertices.

use serde::{Deserialize, Serialize};

use super::TechniqueId;

/// An immutable therapeutic technique description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueRecord {
    pub id: TechniqueId,

    /// Name shown in the knowledge graph (may differ from the conversational display name).
    pub name: String,

    pub description: String,
}

impl TechniqueRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: TechniqueId::new(id),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Weighted link from an emotion to a technique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub technique: TechniqueId,
    /// Strength of evidence that the technique helps, 0.0 to 1.0.
    pub weight: f32,
}

/// The built-in technique catalogue.
pub(crate) fn default_techniques() -> Vec<TechniqueRecord> {
    vec![
        TechniqueRecord::new(
            "deep_breathing",
            "Deep Breathing Exercise",
            "Slow, deep breathing to reduce stress and anxiety",
        ),
        TechniqueRecord::new(
            "cognitive_reframing",
            "Cognitive Reframing",
            "Identifying and changing negative thought patterns",
        ),
        TechniqueRecord::new(
            "mindfulness",
            "Mindfulness Practice",
            "Focusing on the present moment without judgment",
        ),
        TechniqueRecord::new(
            "gratitude",
            "Gratitude Exercise",
            "Reflecting on things to be thankful for",
        ),
        TechniqueRecord::new(
            "progressive_relaxation",
            "Progressive Muscle Relaxation",
            "Tensing and relaxing muscle groups to reduce physical tension",
        ),
        TechniqueRecord::new(
            "journal_writing",
            "Expressive Journal Writing",
            "Writing about emotions and experiences",
        ),
        TechniqueRecord::new(
            "positive_affirmation",
            "Positive Affirmations",
            "Repeating positive statements about oneself",
        ),
        TechniqueRecord::new(
            "social_connection",
            "Social Connection Exercise",
            "Reaching out to supportive people",
        ),
        TechniqueRecord::new(
            "physical_exercise",
            "Physical Exercise",
            "Engaging in physical activity to improve mood",
        ),
        TechniqueRecord::new(
            "visualization",
            "Positive Visualization",
            "Imagining calming or positive scenarios",
        ),
    ]
}

/// Curated emotion -> technique weights. Order within an emotion is the traversal order.
pub(crate) const DEFAULT_EDGES: &[(&str, &str, f32)] = &[
    ("anger", "deep_breathing", 0.9),
    ("anger", "mindfulness", 0.7),
    ("anger", "progressive_relaxation", 0.8),
    ("anger", "cognitive_reframing", 0.8),
    ("anger", "journal_writing", 0.6),
    ("fear", "deep_breathing", 0.9),
    ("fear", "progressive_relaxation", 0.8),
    ("fear", "cognitive_reframing", 0.7),
    ("fear", "visualization", 0.7),
    ("anxiety", "deep_breathing", 0.9),
    ("anxiety", "progressive_relaxation", 0.9),
    ("anxiety", "mindfulness", 0.8),
    ("anxiety", "cognitive_reframing", 0.7),
    ("sadness", "cognitive_reframing", 0.8),
    ("sadness", "gratitude", 0.7),
    ("sadness", "social_connection", 0.9),
    ("sadness", "physical_exercise", 0.8),
    ("sadness", "journal_writing", 0.7),
    ("joy", "gratitude", 0.9),
    ("joy", "social_connection", 0.8),
    ("joy", "positive_affirmation", 0.7),
    ("surprise", "mindfulness", 0.7),
    ("surprise", "journal_writing", 0.6),
    ("disgust", "cognitive_reframing", 0.8),
    ("disgust", "mindfulness", 0.7),
    ("grief", "journal_writing", 0.9),
    ("grief", "social_connection", 0.8),
    ("grief", "mindfulness", 0.7),
    ("stress", "deep_breathing", 0.9),
    ("stress", "progressive_relaxation", 0.9),
    ("stress", "physical_exercise", 0.8),
    ("stress", "mindfulness", 0.8),
    ("loneliness", "social_connection", 0.9),
    ("loneliness", "gratitude", 0.7),
    ("loneliness", "journal_writing", 0.6),
    ("frustration", "deep_breathing", 0.8),
    ("frustration", "cognitive_reframing", 0.8),
    ("frustration", "physical_exercise", 0.7),
    ("neutral", "mindfulness", 0.6),
    ("neutral", "gratitude", 0.6),
    ("neutral", "positive_affirmation", 0.6),
];

pub(crate) const DEFAULT_EMOTIONS: &[&str] = &[
    "anger",
    "disgust",
    "fear",
    "joy",
    "sadness",
    "surprise",
    "neutral",
    "anxiety",
    "stress",
    "grief",
    "loneliness",
    "frustration",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogue_complete() {
        let techniques = default_techniques();
        assert_eq!(techniques.len(), 10);

        for (emotion, technique, weight) in DEFAULT_EDGES {
            assert!(DEFAULT_EMOTIONS.contains(emotion), "unknown emotion {}", emotion);
            assert!(
                techniques.iter().any(|t| t.id.as_str() == *technique),
                "unknown technique {}",
                technique
            );
            assert!((0.0..=1.0).contains(weight));
        }
    }
}
