//! Emotion definitions: score maps produced by analyzers and the canonical categories.

mod category;

pub use category::*;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Mapping from emotion label to a confidence/intensity score.
///
/// Scores are typically in `[0, 1]` but are neither clamped nor normalized.
/// Entries keep the order in which their labels were first inserted, so any
/// "first-seen" tie-break over the map is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionScoreMap {
    entries: Vec<(String, f32)>,
}

impl EmotionScoreMap {
    /// Create a new empty score map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, label: impl Into<String>, score: f32) -> Self {
        self.insert(label, score);
        self
    }

    /// Insert or overwrite a score. An overwritten label keeps its original position.
    ///
    /// Returns the previous score, if any.
    pub fn insert(&mut self, label: impl Into<String>, score: f32) -> Option<f32> {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => Some(std::mem::replace(existing, score)),
            None => {
                self.entries.push((label, score));
                None
            }
        }
    }

    /// Get the score for a label.
    pub fn get(&self, label: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, score)| *score)
    }

    /// Check whether a label is present.
    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(label, score)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(l, s)| (l.as_str(), *s))
    }

    /// Iterate over labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    /// The highest-scoring entry. Ties resolve to the first-seen label.
    pub fn dominant(&self) -> Option<(&str, f32)> {
        let mut best: Option<(&str, f32)> = None;
        for (label, score) in self.iter() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((label, score)),
            }
        }
        best
    }

    /// Entries sorted by score descending. The sort is stable, so equal
    /// scores keep insertion order.
    pub fn ranked(&self) -> Vec<(&str, f32)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

impl<L: Into<String>> FromIterator<(L, f32)> for EmotionScoreMap {
    fn from_iter<I: IntoIterator<Item = (L, f32)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (label, score) in iter {
            map.insert(label, score);
        }
        map
    }
}

impl Serialize for EmotionScoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, score) in &self.entries {
            map.serialize_entry(label, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EmotionScoreMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreMapVisitor;

        impl<'de> Visitor<'de> for ScoreMapVisitor {
            type Value = EmotionScoreMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of emotion labels to numeric scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = EmotionScoreMap::new();
                while let Some((label, score)) = access.next_entry::<String, f32>()? {
                    map.insert(label, score);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ScoreMapVisitor)
    }
}
