//! Knowledge Base module - which techniques help which emotions.
//!
//! The knowledge graph consists of:
//! - **Emotion nodes**: identified by their label
//! - **Technique nodes**: a display name and a description
//! - **Edges**: weighted emotion -> technique links

mod graph;
mod node;
mod technique;

pub use graph::*;
pub use node::*;
pub use technique::*;
