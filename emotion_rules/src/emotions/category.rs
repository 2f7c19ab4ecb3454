//! Canonical emotion categories and the synonym table that maps raw labels onto them.

use serde::{Deserialize, Serialize};

/// The seven categories the response corpus is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmotionCategory {
    Anger,
    Fear,
    Sadness,
    Joy,
    Surprise,
    Disgust,
    #[default]
    Neutral,
}

impl EmotionCategory {
    pub const ALL: [EmotionCategory; 7] = [
        EmotionCategory::Anger,
        EmotionCategory::Fear,
        EmotionCategory::Sadness,
        EmotionCategory::Joy,
        EmotionCategory::Surprise,
        EmotionCategory::Disgust,
        EmotionCategory::Neutral,
    ];

    /// Resolve a raw analyzer label to a canonical category.
    ///
    /// Matching is case-insensitive. Canonical names map to themselves, known
    /// synonyms map through the table, and everything else is `Neutral`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if let Some(category) = Self::ALL.iter().find(|c| c.as_str() == label) {
            return *category;
        }
        match label.as_str() {
            "angry" | "fury" | "furious" | "mad" | "irritated" => EmotionCategory::Anger,

            "anxious" | "nervous" | "worried" | "scared" | "terrified" | "apprehensive"
            | "stress" | "stressed" => EmotionCategory::Fear,

            "sad" | "depressed" | "unhappy" | "miserable" | "down" | "blue" | "grief"
            | "grieving" => EmotionCategory::Sadness,

            "happy" | "excited" | "delighted" | "pleased" | "content" | "joyful" => {
                EmotionCategory::Joy
            }

            "surprised" | "shocked" | "astonished" | "amazed" => EmotionCategory::Surprise,

            "disgusted" | "repulsed" | "revolted" => EmotionCategory::Disgust,

            _ => EmotionCategory::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionCategory::Anger => "anger",
            EmotionCategory::Fear => "fear",
            EmotionCategory::Sadness => "sadness",
            EmotionCategory::Joy => "joy",
            EmotionCategory::Surprise => "surprise",
            EmotionCategory::Disgust => "disgust",
            EmotionCategory::Neutral => "neutral",
        }
    }

    /// Whether the category is a distressing one, where a cheerful tone is out of place.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            EmotionCategory::Anger
                | EmotionCategory::Fear
                | EmotionCategory::Sadness
                | EmotionCategory::Disgust
        )
    }
}

impl std::fmt::Display for EmotionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
