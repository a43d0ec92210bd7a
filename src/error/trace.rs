use thiserror::Error;

use crate::model::node::NodeId;
use crate::model::node::NodeType;

pub type TraceResult<T> = std::result::Result<T, TraceError>;

/// Errors raised while resolving, fetching or traversing the funds-flow graph.
///
/// `NotFound` is the only kind the traversal absorbs (the branch is dropped); every other kind
/// aborts the whole search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    #[error("[Trace] Node not found: {0}")]
    NotFound(NodeId),

    #[error("[Trace] Invalid {node_type} id: {id}")]
    InvalidId { node_type: NodeType, id: String },

    #[error("[Trace] Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("[Trace] Exchange rates unavailable for {currency} at height {height}")]
    RatesUnavailable { currency: String, height: u64 },

    #[error("[Trace] Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("[Trace] Search cancelled")]
    Cancelled,

    #[error("{source} (node {node}, depth {depth})")]
    AtNode {
        node: NodeId,
        depth: usize,
        #[source]
        source: Box<TraceError>,
    },
}

impl TraceError {
    /// Attach the node and depth at which the error surfaced. Already located errors keep the
    /// innermost location.
    pub fn at(
        self,
        node: &NodeId,
        depth: usize,
    ) -> Self {
        match self {
            located @ TraceError::AtNode { .. } => located,
            other => TraceError::AtNode {
                node: node.clone(),
                depth,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error kind with any location wrapper removed.
    pub fn root(&self) -> &TraceError {
        match self {
            TraceError::AtNode { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), TraceError::NotFound(_))
    }

    /// Caller mistakes, as opposed to infrastructure failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self.root(), TraceError::InvalidId { .. } | TraceError::InvalidFilter(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_keeps_innermost_location() {
        let inner = NodeId::Address("A1".to_string());
        let outer = NodeId::Entity(7);
        let err = TraceError::StoreUnavailable("down".to_string()).at(&inner, 2).at(&outer, 1);

        match &err {
            TraceError::AtNode { node, depth, .. } => {
                assert_eq!(node, &inner);
                assert_eq!(*depth, 2);
            },
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.root(), &TraceError::StoreUnavailable("down".to_string()));
        assert!(err.to_string().contains("node address:A1, depth 2"));
    }

    #[test]
    fn test_error_classification() {
        assert!(TraceError::NotFound(NodeId::Entity(1)).at(&NodeId::Entity(1), 3).is_not_found());
        assert!(TraceError::InvalidFilter("field".to_string()).is_client_error());
        assert!(!TraceError::Cancelled.is_client_error());
    }
}
