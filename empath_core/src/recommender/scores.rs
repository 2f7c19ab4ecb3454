//! Accumulated technique scores for a single recommendation pass.

use serde::{Deserialize, Serialize};

use crate::knowledge_base::TechniqueId;

/// Per-technique scores, kept in first-encountered order.
///
/// The order matters: ranking is a stable sort over it, so equal scores
/// resolve to whichever technique the traversal reached first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechniqueScores {
    scores: Vec<(TechniqueId, f32)>,
}

impl TechniqueScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contribution to a technique (accumulates with existing score).
    pub fn add(&mut self, technique: &TechniqueId, contribution: f32) {
        match self.scores.iter_mut().find(|(id, _)| id == technique) {
            Some((_, score)) => *score += contribution,
            None => self.scores.push((technique.clone(), contribution)),
        }
    }

    /// Get the score of a technique, 0.0 if it was never reached.
    pub fn get(&self, technique: &TechniqueId) -> f32 {
        self.scores
            .iter()
            .find(|(id, _)| id == technique)
            .map(|(_, score)| *score)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterate in first-encountered order.
    pub fn iter(&self) -> impl Iterator<Item = (&TechniqueId, f32)> {
        self.scores.iter().map(|(id, score)| (id, *score))
    }

    /// All techniques sorted by score descending, ties in first-encountered order.
    pub fn ranked(&self) -> Vec<(&TechniqueId, f32)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// The ids of the `n` best techniques.
    pub fn top(&self, n: usize) -> Vec<TechniqueId> {
        self.ranked()
            .into_iter()
            .take(n)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulation() {
        let mut scores = TechniqueScores::new();
        let id = TechniqueId::from("mindfulness");

        scores.add(&id, 0.3);
        scores.add(&id, 0.4);

        assert!((scores.get(&id) - 0.7).abs() < 0.001);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get(&TechniqueId::from("other")), 0.0);
    }

    #[test]
    fn test_ranked_ties_keep_encounter_order() {
        let mut scores = TechniqueScores::new();
        scores.add(&TechniqueId::from("b"), 0.5);
        scores.add(&TechniqueId::from("a"), 0.9);
        scores.add(&TechniqueId::from("c"), 0.5);

        let ids: Vec<_> = scores.ranked().into_iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_top_truncates() {
        let mut scores = TechniqueScores::new();
        for (i, id) in ["x", "y", "z"].iter().enumerate() {
            scores.add(&TechniqueId::from(*id), i as f32);
        }

        assert_eq!(
            scores.top(2),
            vec![TechniqueId::from("z"), TechniqueId::from("y")]
        );
        assert!(scores.top(0).is_empty());
    }
}
