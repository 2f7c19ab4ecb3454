//! Node definitions - the two kinds of vertices in the knowledge graph.

use serde::{Deserialize, Serialize};

/// An emotion vertex. Its id is the emotion label itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmotionNode(pub String);

impl EmotionNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmotionNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a technique vertex (e.g. `deep_breathing`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechniqueId(pub String);

impl TechniqueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human display name for this id.
    ///
    /// Known techniques use a fixed table; anything else is title-cased
    /// from its snake_case form.
    pub fn display_name(&self) -> String {
        let known = match self.0.as_str() {
            "deep_breathing" => Some("Deep Breathing"),
            "mindfulness" => Some("Mindfulness Practice"),
            "cognitive_reframing" => Some("Cognitive Reframing"),
            "gratitude" => Some("Gratitude Practice"),
            "progressive_relaxation" => Some("Progressive Muscle Relaxation"),
            "journal_writing" => Some("Expressive Journal Writing"),
            "positive_affirmation" => Some("Positive Affirmations"),
            "social_connection" => Some("Social Connection"),
            "physical_exercise" => Some("Physical Activity"),
            "visualization" => Some("Positive Visualization"),
            _ => None,
        };
        known.map(str::to_string).unwrap_or_else(|| title_case(&self.0))
    }
}

impl From<&str> for TechniqueId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TechniqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `box_breathing` -> `Box Breathing`.
pub(crate) fn title_case(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_display_names() {
        assert_eq!(TechniqueId::from("deep_breathing").display_name(), "Deep Breathing");
        assert_eq!(
            TechniqueId::from("physical_exercise").display_name(),
            "Physical Activity"
        );
    }

    #[test]
    fn test_unknown_display_name_title_cased() {
        assert_eq!(TechniqueId::from("box_breathing").display_name(), "Box Breathing");
        assert_eq!(TechniqueId::from("EMDR").display_name(), "Emdr");
        assert_eq!(TechniqueId::from("a__b").display_name(), "A B");
    }

    #[test]
    fn test_technique_id_serializes_as_string() {
        let json = serde_json::to_string(&TechniqueId::from("gratitude")).unwrap();
        assert_eq!(json, "\"gratitude\"");
    }
}
