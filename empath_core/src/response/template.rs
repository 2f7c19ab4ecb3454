//! Template compositor - deterministic-structure responses assembled from the corpus.
//!
//! This is the end of the fallback chain that still produces tailored text;
//! it never fails outward.

use emotion_rules::{EmotionCategory, EmotionScoreMap};
use rand::seq::SliceRandom;
use rand::Rng;

use super::corpus::{TemplateCorpus, TECHNIQUE_PLACEHOLDER};
use crate::error::TemplateRenderError;
use crate::knowledge_base::TechniqueId;

/// Returned when composition itself fails.
pub const LITERAL_FALLBACK: &str = "I understand you're sharing something important with me. \
Could you tell me more about how you're feeling right now?";

/// At most this many technique blocks appear in a response.
pub const MAX_TEMPLATE_TECHNIQUES: usize = 2;

/// Connector placed before the second technique block.
pub const SECOND_TECHNIQUE_CONNECTOR: &str = "Additionally,";

/// Assembles responses from a [`TemplateCorpus`].
#[derive(Debug, Clone, Default)]
pub struct TemplateCompositor {
    corpus: TemplateCorpus,
}

impl TemplateCompositor {
    pub fn new(corpus: TemplateCorpus) -> Self {
        Self { corpus }
    }

    pub fn with_defaults() -> Self {
        Self::new(TemplateCorpus::builtin())
    }

    pub fn corpus(&self) -> &TemplateCorpus {
        &self.corpus
    }

    /// The category the response is written for.
    ///
    /// Highest score wins, ties go to the first-seen label. Labels without a
    /// mapping, and categories the corpus has no greetings for, become `Neutral`.
    pub fn primary_category(&self, emotions: &EmotionScoreMap) -> EmotionCategory {
        let category = emotions
            .dominant()
            .map(|(label, _)| EmotionCategory::from_label(label))
            .unwrap_or_default();

        if self.corpus.covers(category) {
            category
        } else {
            EmotionCategory::Neutral
        }
    }

    /// Compose with the thread-local random source.
    pub fn compose(&self, emotions: &EmotionScoreMap, techniques: &[TechniqueId]) -> String {
        self.compose_with(&mut rand::thread_rng(), emotions, techniques)
    }

    /// Compose with an injected random source. Never fails; lookup errors
    /// produce [`LITERAL_FALLBACK`].
    pub fn compose_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        emotions: &EmotionScoreMap,
        techniques: &[TechniqueId],
    ) -> String {
        match self.try_compose_with(rng, emotions, techniques) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(target: "empath::template", error = %e, "Error composing template response");
                LITERAL_FALLBACK.to_string()
            }
        }
    }

    /// Compose, reporting missing corpus entries.
    pub fn try_compose_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        emotions: &EmotionScoreMap,
        techniques: &[TechniqueId],
    ) -> Result<String, TemplateRenderError> {
        let category = self.primary_category(emotions);
        let mut parts: Vec<String> = Vec::new();

        parts.push(pick_keyed(rng, &self.corpus.greeting, "greeting", category)?.to_string());
        // Validation is optional per category.
        if let Some(validation) = self
            .corpus
            .validation
            .get(category.as_str())
            .and_then(|list| list.choose(rng))
        {
            parts.push(validation.clone());
        }

        for (i, technique) in techniques.iter().take(MAX_TEMPLATE_TECHNIQUES).enumerate() {
            if i == 1 {
                parts.push(SECOND_TECHNIQUE_CONNECTOR.to_string());
            }

            let intro = pick(rng, &self.corpus.technique_intro, "technique_intro")?;
            parts.push(intro.replace(TECHNIQUE_PLACEHOLDER, &technique.display_name()));

            // Techniques without descriptions still get their introduction.
            if let Some(description) = self
                .corpus
                .technique_description
                .get(technique.as_str())
                .and_then(|list| list.choose(rng))
            {
                parts.push(description.clone());
            }
        }

        parts.push(pick(rng, &self.corpus.follow_up, "follow_up")?.to_string());
        parts.push(pick(rng, &self.corpus.closing, "closing")?.to_string());

        Ok(parts.join(" "))
    }
}

fn pick<'a, R: Rng + ?Sized>(
    rng: &mut R,
    phrases: &'a [String],
    section: &'static str,
) -> Result<&'a str, TemplateRenderError> {
    phrases
        .choose(rng)
        .map(String::as_str)
        .ok_or(TemplateRenderError::EmptySection(section))
}

fn pick_keyed<'a, R: Rng + ?Sized>(
    rng: &mut R,
    table: &'a std::collections::HashMap<String, Vec<String>>,
    section: &'static str,
    category: EmotionCategory,
) -> Result<&'a str, TemplateRenderError> {
    table
        .get(category.as_str())
        .and_then(|phrases| phrases.choose(rng))
        .map(String::as_str)
        .ok_or_else(|| TemplateRenderError::MissingCategory {
            section,
            category: category.to_string(),
        })
}
