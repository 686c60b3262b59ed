use derive_more::Display;

use crate::types::{CommID, VertexAttr};

/// Result alias for partition and store operations.
pub type Result<T> = std::result::Result<T, PartitionError>;

/// Preconditions that partition operations depend on.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// The partition labels were already assigned once.
    #[display(fmt = "community partition already initialized")]
    AlreadyInitialized,
    /// No partition labels exist yet.
    #[display(fmt = "community partition not initialized")]
    NotInitialized,
    /// The caller asked for a community range that is not the dense populated one.
    #[display(fmt = "requested {} communities but the populated range holds {}", requested, actual)]
    CommunityCountMismatch { requested: usize, actual: usize },
}

/// Errors returned by the graph store and its partition views.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// A unique lookup matched no vertex.
    #[display(fmt = "no vertex with {} = {}", attr, value)]
    NotFound { attr: VertexAttr, value: u32 },
    /// Holders of one node-community disagree on their community.
    #[display(fmt = "node community {} spans communities {:?}", node_community, communities)]
    InvariantViolation {
        node_community: CommID,
        communities: Vec<CommID>,
    },
    #[display(fmt = "precondition violated: {}", _0)]
    PreconditionViolation(Precondition),
}

impl std::error::Error for PartitionError {}

impl From<Precondition> for PartitionError {
    fn from(precondition: Precondition) -> Self {
        PartitionError::PreconditionViolation(precondition)
    }
}

impl PartitionError {
    pub(crate) fn not_found(attr: VertexAttr, value: u32) -> Self {
        PartitionError::NotFound { attr, value }
    }
}
