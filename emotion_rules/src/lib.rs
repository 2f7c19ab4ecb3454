//! # Emotion Rules
//!
//! The shared vocabulary of Empath: emotion score maps, canonical emotion
//! categories, modality fusion policies, and provider configuration.
//! This crate performs no recommendation or text generation.

pub mod config;
pub mod emotions;
pub mod fusion;

pub use config::*;
pub use emotions::*;
pub use fusion::*;
