//! Fusion policies: combining per-modality emotion score maps into one map.

use serde::{Deserialize, Serialize};

use crate::emotions::EmotionScoreMap;

/// Input modalities that produce emotion score maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    Text,
    Audio,
}

impl Modality {
    /// Fixed evidence weight for this modality. Text evidence is favored.
    pub fn weight(&self) -> f32 {
        match self {
            Modality::Text => 0.7,
            Modality::Audio => 0.3,
        }
    }
}

/// The two fusion semantics in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FusionPolicy {
    /// Every key of either map is weighted: `0.3 * audio + 0.7 * text`.
    /// Used when audio is the primary signal.
    UnionSymmetric,
    /// Text map is the base; only keys present in audio are rewritten.
    /// Text-only keys pass through unscaled.
    AdditiveOverwrite,
}

impl FusionPolicy {
    /// Combine a text map and an audio map under this policy.
    pub fn fuse(&self, text: &EmotionScoreMap, audio: &EmotionScoreMap) -> EmotionScoreMap {
        match self {
            FusionPolicy::UnionSymmetric => fuse_union(text, audio),
            FusionPolicy::AdditiveOverwrite => fuse_additive_overwrite(text, audio),
        }
    }
}

/// Union-symmetric fusion.
///
/// The result holds every key of `audio ∪ text` (audio keys first, then
/// text-only keys) with `0.3 * audio.get(k, 0) + 0.7 * text.get(k, 0)`.
pub fn fuse_union(text: &EmotionScoreMap, audio: &EmotionScoreMap) -> EmotionScoreMap {
    audio
        .labels()
        .chain(text.labels().filter(|l| !audio.contains(l)))
        .map(|label| {
            let audio_score = audio.get(label).unwrap_or(0.0);
            let text_score = text.get(label).unwrap_or(0.0);
            (
                label.to_string(),
                Modality::Audio.weight() * audio_score + Modality::Text.weight() * text_score,
            )
        })
        .collect()
}

/// Additive-overwrite fusion.
///
/// Starts from `text`. For each key in `audio`: if the key exists in text it
/// becomes `0.7 * text[k] + 0.3 * audio[k]`, otherwise `0.3 * audio[k]`.
/// Keys only in `text` keep their original value.
pub fn fuse_additive_overwrite(text: &EmotionScoreMap, audio: &EmotionScoreMap) -> EmotionScoreMap {
    let mut combined = text.clone();
    for (label, audio_score) in audio.iter() {
        let fused = match text.get(label) {
            Some(text_score) => {
                Modality::Text.weight() * text_score + Modality::Audio.weight() * audio_score
            }
            None => Modality::Audio.weight() * audio_score,
        };
        combined.insert(label, fused);
    }
    combined
}
