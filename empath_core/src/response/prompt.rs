//! Prompt assembly shared by the provider strategies.

use emotion_rules::{EmotionCategory, EmotionScoreMap};

use super::GenerationRequest;
use crate::knowledge_base::TechniqueId;

const ROLE: &str = "You are an empathetic AI therapeutic assistant.";

const GUIDELINES: &str = "Your response should:
1. Acknowledge and validate the user's emotions
2. Offer 1-2 suggested techniques or approaches that might help
3. End with a thoughtful question to continue the conversation

Be warm, supportive, and professional. Keep your response concise (100-200 words).";

const NEGATIVE_TONE: &str =
    "The dominant emotion is negative: do not be overly cheerful, and stay gentle and grounded.";

const POSITIVE_TONE: &str = "Avoid being overly cheerful if the emotions turn negative.";

/// `anger: 0.90, neutral: 0.10` - every label, two decimals, in map order.
pub fn emotion_summary(emotions: &EmotionScoreMap) -> String {
    emotions
        .iter()
        .map(|(label, score)| format!("{}: {:.2}", label, score))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Display names of the ranked techniques, comma separated.
pub fn technique_names(techniques: &[TechniqueId]) -> String {
    techniques
        .iter()
        .map(TechniqueId::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A provider-neutral prompt: system instruction plus the user's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Build the system instruction and user turn for a request.
    pub fn for_request(request: &GenerationRequest) -> Self {
        let dominant = request
            .emotions
            .dominant()
            .map(|(label, _)| EmotionCategory::from_label(label))
            .unwrap_or_default();
        let tone = if dominant.is_negative() {
            NEGATIVE_TONE
        } else {
            POSITIVE_TONE
        };

        let system = format!(
            "{ROLE}\nRespond to the user's message with empathy, validation, and helpful suggestions.\n\
             The user's primary emotions have been detected as: {}\n\
             Recommended therapeutic techniques: {}\n\n{GUIDELINES}\n{tone}",
            emotion_summary(&request.emotions),
            technique_names(&request.techniques),
        );

        Self {
            system,
            user: request.text.clone(),
        }
    }

    /// Single-string form for completion-style backends.
    pub fn inline(&self) -> String {
        format!(
            "{}\n\nThe user's message is: '{}'\n\nYour response:",
            self.system, self.user
        )
    }

    /// ChatML form, terminated by an open assistant turn.
    pub fn chatml(&self) -> String {
        format!(
            "<|im_start|>system\n{}<|im_end|>\n<|im_start|>user\n{}<|im_end|>\n<|im_start|>assistant\n",
            self.system, self.user
        )
    }
}
