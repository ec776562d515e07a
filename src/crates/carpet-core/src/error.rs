use thiserror::Error;

/// A structural rule of the phrase tree that does not hold
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("terminal '{word}' also has {children} children")]
    TerminalWithChildren { word: String, children: usize },

    #[error("node has neither a terminal nor children")]
    Degenerate,

    #[error("multiplier must be at least 1")]
    ZeroMultiplier,
}

/// Failure to turn a structured document back into a phrase tree
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid document: {0}")]
    Invariant(#[from] InvariantError),

    #[error("malformed document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A collaborator lookup that came back empty
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{key}' not found")]
pub struct NotFound {
    pub key: String,
}

impl NotFound {
    pub fn new(key: impl Into<String>) -> Self {
        NotFound { key: key.into() }
    }
}
