//! The phrase corpus behind template-composed responses.

use emotion_rules::EmotionCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::TemplateLoadError;

/// Placeholder substituted with a technique display name in introduction phrases.
pub const TECHNIQUE_PLACEHOLDER: &str = "{technique_name}";

/// Phrase sets used by the template compositor.
///
/// `greeting` and `validation` are keyed by canonical category name,
/// `technique_description` by technique id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCorpus {
    pub greeting: HashMap<String, Vec<String>>,
    pub validation: HashMap<String, Vec<String>>,
    pub technique_intro: Vec<String>,
    pub technique_description: HashMap<String, Vec<String>>,
    pub follow_up: Vec<String>,
    pub closing: Vec<String>,
}

impl Default for TemplateCorpus {
    fn default() -> Self {
        Self::builtin()
    }
}

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn keyed<const N: usize>(entries: &[(&str, [&str; N])]) -> HashMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(key, list)| (key.to_string(), phrases(list.as_slice())))
        .collect()
}

impl TemplateCorpus {
    /// The built-in corpus: 7 categories x 3 greetings and validations,
    /// 5 introductions, 2 descriptions per technique, 5 follow-ups, 5 closings.
    pub fn builtin() -> Self {
        let greeting = keyed(&[
            ("anger", [
                "I notice you seem frustrated right now.",
                "It sounds like you're feeling angry about this situation.",
                "I can sense some frustration in what you're expressing.",
            ]),
            ("fear", [
                "I notice you seem anxious or worried.",
                "It sounds like this situation is causing you some fear.",
                "I can tell you're feeling apprehensive about this.",
            ]),
            ("sadness", [
                "I notice you seem to be feeling down right now.",
                "It sounds like you're going through a difficult time.",
                "I can sense some sadness in what you're sharing.",
            ]),
            ("joy", [
                "I notice you're feeling positive about this!",
                "It sounds like things are going well for you.",
                "I can sense the enthusiasm in what you're sharing.",
            ]),
            ("surprise", [
                "This seems to have caught you off guard.",
                "It sounds like this was unexpected for you.",
                "I can tell you weren't anticipating this development.",
            ]),
            ("disgust", [
                "I notice this situation seems troubling to you.",
                "It sounds like you're having a strong negative reaction to this.",
                "I can tell this is something you find difficult to accept.",
            ]),
            ("neutral", [
                "I hear what you're saying.",
                "Thank you for sharing this with me.",
                "I understand what you're expressing.",
            ]),
        ]);

        let validation = keyed(&[
            ("anger", [
                "It's completely natural to feel angry in this situation.",
                "Your frustration makes a lot of sense given what you've described.",
                "Many people would feel similarly in your position.",
            ]),
            ("fear", [
                "It's understandable to feel anxious about this.",
                "This kind of worry is a natural response to uncertainty.",
                "Your concerns are valid given what you're facing.",
            ]),
            ("sadness", [
                "It's okay to feel sad about this - it's a natural response.",
                "What you're feeling is a normal reaction to loss or disappointment.",
                "Many people would feel down in this situation.",
            ]),
            ("joy", [
                "It's wonderful that you're feeling good about this!",
                "You have every reason to feel happy about this accomplishment.",
                "Your positive feelings are well-deserved.",
            ]),
            ("surprise", [
                "It's natural to feel taken aback by unexpected changes.",
                "Surprise can be disorienting, and that's completely normal.",
                "It makes sense that you didn't see this coming.",
            ]),
            ("disgust", [
                "It's understandable to have such a strong reaction to this.",
                "Many people would find this situation challenging.",
                "Your response is a natural reaction to something that conflicts with your values.",
            ]),
            ("neutral", [
                "Thank you for sharing your perspective.",
                "I appreciate you explaining how you see this situation.",
                "It's helpful to understand your point of view.",
            ]),
        ]);

        let technique_intro = phrases(&[
            "Something that might help in this situation is {technique_name}.",
            "Many people find that {technique_name} can be beneficial when feeling this way.",
            "One approach that could be helpful is {technique_name}.",
            "Have you ever tried {technique_name}? It might be helpful.",
            "I'd like to suggest trying {technique_name}.",
        ]);

        let technique_description = keyed(&[
            ("deep_breathing", [
                "Take a slow, deep breath in through your nose for 4 counts, hold for 2, and exhale through your mouth for 6 counts. Repeat this several times while focusing on your breath.",
                "Find a comfortable position and practice breathing deeply into your abdomen. Breathe in slowly through your nose, and out through your mouth, making your exhale longer than your inhale.",
            ]),
            ("mindfulness", [
                "Take a moment to notice five things you can see, four things you can touch, three things you can hear, two things you can smell, and one thing you can taste. This can help ground you in the present moment.",
                "Set aside a few minutes to focus entirely on the present moment. Notice your surroundings, your bodily sensations, and your thoughts without judgment.",
            ]),
            ("cognitive_reframing", [
                "Consider if there might be another way to look at this situation. What would you say to a friend facing the same circumstances?",
                "Try to identify any thought patterns that might be making you feel worse. Ask yourself if there's evidence for these thoughts, or if there might be a more balanced perspective.",
            ]),
            ("gratitude", [
                "Try taking a moment to think of three things you're grateful for today, no matter how small they might seem.",
                "Consider keeping a gratitude journal where you write down a few things you appreciate each day. This can help shift focus toward positive aspects of your life.",
            ]),
            ("progressive_relaxation", [
                "Try tensing and then relaxing each muscle group in your body, starting from your toes and working up to your head. Hold the tension for 5 seconds before releasing.",
                "Find a quiet place where you can lie down comfortably. Tense each muscle group for a few seconds, then release and notice the sensation of relaxation.",
            ]),
            ("journal_writing", [
                "Writing about your feelings can sometimes help process them. Try spending 10-15 minutes writing freely about your thoughts and emotions without worrying about grammar or structure.",
                "Consider keeping a journal where you can express your thoughts and track patterns in your emotions over time.",
            ]),
            ("positive_affirmation", [
                "Try creating a simple, positive statement about yourself that you can repeat when you need encouragement, such as 'I am capable of handling challenges' or 'I am worthy of respect and care.'",
                "Choose an affirmation that feels meaningful to you and repeat it to yourself several times, especially when facing difficult moments.",
            ]),
            ("social_connection", [
                "Consider reaching out to someone you trust to share how you're feeling. Even a brief conversation can sometimes help provide perspective.",
                "Think about a supportive person in your life. How might connecting with them help you navigate this situation?",
            ]),
            ("physical_exercise", [
                "Even a short walk or some gentle stretching can help shift your emotional state through the release of endorphins.",
                "Consider engaging in some form of physical movement that you enjoy, whether that's dancing, yoga, running, or anything else that gets your body moving.",
            ]),
            ("visualization", [
                "Take a few minutes to close your eyes and imagine a peaceful place where you feel safe and calm. Notice the details in this place using all your senses.",
                "Try visualizing yourself successfully navigating this challenge. What would that look like? How would you feel?",
            ]),
        ]);

        let follow_up = phrases(&[
            "How does that suggestion sound to you?",
            "Would you be willing to try this approach?",
            "Does this resonate with what you're experiencing?",
            "What are your thoughts about this suggestion?",
            "Would you like to explore more techniques like this?",
        ]);

        let closing = phrases(&[
            "Remember that experiencing emotions is part of being human. Be gentle with yourself as you navigate this.",
            "I'm here to support you through this process whenever you need to talk.",
            "Take the time you need to process these feelings. Emotional well-being is a journey.",
            "Remember that seeking support is a sign of strength, not weakness.",
            "I hope these suggestions provide some help. Please let me know if there's anything else I can do to support you.",
        ]);

        Self {
            greeting,
            validation,
            technique_intro,
            technique_description,
            follow_up,
            closing,
        }
    }

    /// Whether greetings exist for a category.
    pub fn covers(&self, category: EmotionCategory) -> bool {
        self.greeting
            .get(category.as_str())
            .map(|list| !list.is_empty())
            .unwrap_or(false)
    }

    /// Parse a JSON corpus.
    pub fn from_json_str(json: &str) -> Result<Self, TemplateLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, TemplateLoadError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Load a JSON corpus, falling back to the built-in corpus on any error.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(corpus) => {
                tracing::info!(target: "empath::template", path = %path.display(), "Loaded response templates");
                corpus
            }
            Err(e) => {
                tracing::error!(
                    target: "empath::template",
                    path = %path.display(),
                    error = %e,
                    "Error loading templates; using built-in corpus"
                );
                Self::builtin()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_shape() {
        let corpus = TemplateCorpus::builtin();

        for category in EmotionCategory::ALL {
            assert!(corpus.covers(category));
            assert_eq!(corpus.greeting[category.as_str()].len(), 3);
            assert_eq!(corpus.validation[category.as_str()].len(), 3);
        }
        assert_eq!(corpus.technique_intro.len(), 5);
        assert!(corpus
            .technique_intro
            .iter()
            .all(|p| p.contains(TECHNIQUE_PLACEHOLDER)));
        assert_eq!(corpus.technique_description.len(), 10);
        assert!(corpus.technique_description.values().all(|v| v.len() == 2));
        assert_eq!(corpus.follow_up.len(), 5);
        assert_eq!(corpus.closing.len(), 5);
    }

    #[test]
    fn test_load_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        std::fs::write(&path, r#"{"greeting": {}}"#).unwrap();

        assert!(TemplateCorpus::try_load(&path).is_err());
        assert_eq!(TemplateCorpus::load(&path), TemplateCorpus::builtin());
    }

    #[test]
    fn test_load_custom_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        let mut corpus = TemplateCorpus::builtin();
        corpus.closing = vec!["Take care.".to_string()];
        std::fs::write(&path, serde_json::to_string(&corpus).unwrap()).unwrap();

        let loaded = TemplateCorpus::load(&path);
        assert_eq!(loaded.closing, vec!["Take care.".to_string()]);
    }
}
