//! Error taxonomy.
//!
//! Only [`InputValidationError`] ever reaches a caller. Every other error is
//! recovered where it happens and logged.

use thiserror::Error;

/// A persisted graph could not be read or interpreted.
#[derive(Debug, Error)]
pub enum GraphLoadError {
    #[error("failed to read graph snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed graph snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("node '{id}' has unknown type '{kind}'")]
    InvalidNode { id: String, kind: String },
}

/// A graph snapshot could not be written.
#[derive(Debug, Error)]
pub enum GraphSaveError {
    #[error("failed to write graph snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize graph snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A text-generation backend failed to produce a usable reply.
#[derive(Debug, Error)]
pub enum ProviderCallError {
    #[error("no API key configured for provider '{0}'")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider returned an empty completion")]
    EmptyCompletion,
}

/// The template corpus lacks an entry the composition needs.
#[derive(Debug, Error)]
pub enum TemplateRenderError {
    #[error("no '{section}' phrases for category '{category}'")]
    MissingCategory {
        section: &'static str,
        category: String,
    },

    #[error("template section '{0}' is empty")]
    EmptySection(&'static str),
}

/// A request rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputValidationError {
    #[error("text content is required")]
    MissingText,
}

/// A template corpus file could not be read or parsed.
#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("failed to read template corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed template corpus: {0}")]
    Parse(#[from] serde_json::Error),
}
