use crate::schema::NodeId;
use carpet_core::InvariantError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid composition: {0}")]
    InvalidComposition(String),

    #[error("composition cycle through node {0}")]
    CyclicComposition(NodeId),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("node {parent} already has a child at index {index}")]
    DuplicateEdge { parent: NodeId, index: i16 },

    #[error("edge endpoint {0} does not exist")]
    MissingEndpoint(NodeId),
}

impl From<InvariantError> for StoreError {
    fn from(err: InvariantError) -> Self {
        StoreError::InvalidComposition(err.to_string())
    }
}
