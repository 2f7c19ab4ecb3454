//! # Empath Core
//!
//! Turns detected emotions into coping-technique recommendations and an
//! empathetic reply. Emotion detection itself happens upstream; this crate
//! receives score maps from `emotion_rules` types.
//!
//! ## Core Components
//!
//! - **knowledge_base**: Weighted emotion -> technique graph with JSON persistence
//! - **recommender**: Scores techniques from the top emotions of a score map
//! - **response**: Provider strategies with a template compositor fallback
//! - **engine**: The full pipeline behind one shared graph
//!
//! ## Failure Model
//!
//! - **Degrade, don't raise**: graph load, provider calls, and template
//!   composition all fall back to a default and log the cause
//! - **Boundary validation only**: the single error a caller can see is an
//!   empty text message

pub mod engine;
pub mod error;
pub mod knowledge_base;
pub mod recommender;
pub mod response;

pub use engine::*;
pub use error::*;
pub use knowledge_base::*;
pub use recommender::*;
pub use response::*;
