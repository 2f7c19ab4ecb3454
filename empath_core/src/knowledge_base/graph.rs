//! Knowledge Graph - emotions, techniques, and the weighted links between them.

use emotion_rules::EmotionScoreMap;
use serde::{Deserialize, Serialize};
use indexmap::{IndexMap, IndexSet};
use std::borrow::Borrow;
use std::path::Path;

use super::technique::{default_techniques, DEFAULT_EDGES, DEFAULT_EMOTIONS};
use super::{Edge, EmotionNode, TechniqueId, TechniqueRecord};
use crate::error::{GraphLoadError, GraphSaveError};
use crate::recommender::Recommender;

impl Borrow<str> for EmotionNode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The emotion-to-technique knowledge graph.
///
/// Bipartite by construction: edges only ever run from an emotion to a
/// technique, and both endpoints must be registered. Emotions without edges
/// are legal and simply yield no candidates.
///
/// Every table keeps insertion order, so snapshots are written and read back
/// in the same traversal order.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    emotions: IndexSet<EmotionNode>,

    techniques: IndexMap<TechniqueId, TechniqueRecord>,

    /// Emotion -> outgoing edges, in insertion (traversal) order.
    adjacency: IndexMap<EmotionNode, Vec<Edge>>,
}

impl KnowledgeGraph {
    /// Create a new empty knowledge graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in graph: 12 emotions, 10 techniques, curated weights.
    pub fn build_default() -> Self {
        let mut graph = Self::new();
        for emotion in DEFAULT_EMOTIONS {
            graph.add_emotion(*emotion);
        }
        for technique in default_techniques() {
            graph.add_technique(technique);
        }
        for (emotion, technique, weight) in DEFAULT_EDGES {
            graph.add_edge(emotion, &TechniqueId::from(*technique), *weight);
        }
        graph
    }

    /// Register an emotion node. Returns false if it already existed.
    pub fn add_emotion(&mut self, label: impl Into<String>) -> bool {
        self.emotions.insert(EmotionNode::new(label))
    }

    /// Register or replace a technique node.
    pub fn add_technique(&mut self, record: TechniqueRecord) {
        self.techniques.insert(record.id.clone(), record);
    }

    /// Link an emotion to a technique. The weight is clamped to `[0, 1]`.
    ///
    /// Re-linking an existing pair replaces its weight in place. Returns false
    /// when either endpoint is not registered.
    pub fn add_edge(&mut self, emotion: &str, technique: &TechniqueId, weight: f32) -> bool {
        if !self.emotions.contains(emotion) || !self.techniques.contains_key(technique) {
            return false;
        }
        let weight = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };

        let edges = self.adjacency.entry(EmotionNode::new(emotion)).or_default();
        if let Some(existing) = edges.iter_mut().find(|e| &e.technique == technique) {
            existing.weight = weight;
        } else {
            edges.push(Edge {
                technique: technique.clone(),
                weight,
            });
        }
        true
    }

    /// Check if an emotion node exists.
    pub fn has_emotion(&self, label: &str) -> bool {
        self.emotions.contains(label)
    }

    /// Outgoing edges of an emotion, in traversal order.
    pub fn edges(&self, emotion: &str) -> &[Edge] {
        self.adjacency.get(emotion).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get a technique record by id.
    pub fn technique(&self, id: &TechniqueId) -> Option<&TechniqueRecord> {
        self.techniques.get(id)
    }

    /// Owned technique details, or `None` when the id is unknown.
    pub fn technique_details(&self, id: &str) -> Option<TechniqueRecord> {
        self.techniques.get(&TechniqueId::from(id)).cloned()
    }

    pub fn emotions(&self) -> impl Iterator<Item = &EmotionNode> {
        self.emotions.iter()
    }

    pub fn techniques(&self) -> impl Iterator<Item = &TechniqueRecord> {
        self.techniques.values()
    }

    pub fn emotion_count(&self) -> usize {
        self.emotions.len()
    }

    pub fn technique_count(&self) -> usize {
        self.techniques.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Rank techniques for an emotion map with the default recommender.
    pub fn recommend(&self, scores: &EmotionScoreMap, max_techniques: usize) -> Vec<TechniqueId> {
        Recommender::with_defaults().recommend(self, scores, max_techniques)
    }

    /// Convert to the persisted node-table / adjacency-table form.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let mut nodes = IndexMap::new();
        for emotion in &self.emotions {
            nodes.insert(emotion.0.clone(), NodeAttributes::emotion());
        }
        for record in self.techniques.values() {
            nodes.insert(
                record.id.0.clone(),
                NodeAttributes::technique(&record.name, &record.description),
            );
        }

        let edges = self
            .adjacency
            .iter()
            .filter(|(_, edges)| !edges.is_empty())
            .map(|(emotion, edges)| {
                let targets = edges
                    .iter()
                    .map(|e| (e.technique.0.clone(), EdgeAttributes { weight: e.weight }))
                    .collect();
                (emotion.0.clone(), targets)
            })
            .collect();

        GraphSnapshot { nodes, edges }
    }

    /// Rebuild a graph from a snapshot.
    ///
    /// Edges recorded technique -> emotion are flipped. Edges between two
    /// nodes of the same kind, or naming an undeclared node, are skipped.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphLoadError> {
        let mut graph = Self::new();

        for (id, attrs) in &snapshot.nodes {
            match attrs.kind.as_str() {
                NodeAttributes::EMOTION => {
                    graph.add_emotion(id.clone());
                }
                NodeAttributes::TECHNIQUE => {
                    let name = attrs
                        .name
                        .clone()
                        .unwrap_or_else(|| super::node::title_case(id));
                    let description = attrs.description.clone().unwrap_or_default();
                    graph.add_technique(TechniqueRecord::new(id.clone(), name, description));
                }
                other => {
                    return Err(GraphLoadError::InvalidNode {
                        id: id.clone(),
                        kind: other.to_string(),
                    })
                }
            }
        }

        for (source, targets) in &snapshot.edges {
            for (target, attrs) in targets {
                let linked = if graph.has_emotion(source) {
                    graph.add_edge(source, &TechniqueId::from(target.as_str()), attrs.weight)
                } else {
                    graph.add_edge(target, &TechniqueId::from(source.as_str()), attrs.weight)
                };
                if !linked {
                    tracing::warn!(
                        target: "empath::graph",
                        source = %source,
                        target_node = %target,
                        "Skipping edge that does not join an emotion to a technique"
                    );
                }
            }
        }

        Ok(graph)
    }

    /// Parse a JSON snapshot.
    pub fn from_json_str(json: &str) -> Result<Self, GraphLoadError> {
        let snapshot: GraphSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Load a snapshot file, reporting failures.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, GraphLoadError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Load a snapshot file. Any failure is logged and the default graph is returned.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(graph) => {
                tracing::info!(
                    target: "empath::graph",
                    path = %path.display(),
                    emotions = graph.emotion_count(),
                    techniques = graph.technique_count(),
                    "Loaded knowledge graph"
                );
                graph
            }
            Err(e) => {
                tracing::error!(
                    target: "empath::graph",
                    path = %path.display(),
                    error = %e,
                    "Error loading knowledge graph; using default graph"
                );
                Self::build_default()
            }
        }
    }

    /// Write a snapshot file, creating parent directories as needed.
    pub fn try_save(&self, path: impl AsRef<Path>) -> Result<(), GraphSaveError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.to_snapshot())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Write a snapshot file. Failure is logged, not raised; returns whether it succeeded.
    pub fn save(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.try_save(path) {
            Ok(()) => {
                tracing::info!(target: "empath::graph", path = %path.display(), "Saved knowledge graph");
                true
            }
            Err(e) => {
                tracing::error!(
                    target: "empath::graph",
                    path = %path.display(),
                    error = %e,
                    "Error saving knowledge graph"
                );
                false
            }
        }
    }
}

/// Persisted graph: a node table plus an adjacency table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: IndexMap<String, NodeAttributes>,

    /// Source id -> (target id -> attributes), in traversal order.
    #[serde(default)]
    pub edges: IndexMap<String, IndexMap<String, EdgeAttributes>>,
}

/// Attribute record of a persisted node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// `emotion` or `technique`.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeAttributes {
    pub const EMOTION: &'static str = "emotion";
    pub const TECHNIQUE: &'static str = "technique";

    pub fn emotion() -> Self {
        Self {
            kind: Self::EMOTION.to_string(),
            name: None,
            description: None,
        }
    }

    pub fn technique(name: &str, description: &str) -> Self {
        Self {
            kind: Self::TECHNIQUE.to_string(),
            name: Some(name.to_string()),
            description: Some(description.to_string()),
        }
    }
}

fn default_edge_weight() -> f32 {
    0.5
}

/// Attribute record of a persisted edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttributes {
    #[serde(default = "default_edge_weight")]
    pub weight: f32,
}
