// Error types for the map engine.
//
// Every failure is local and synchronous: the operation that hit it returns
// it and nothing is retried internally. Structural violations (missing
// parent, unknown id, self-loop) are reported, never panicked on.
// `NoPathFound` is an expected outcome for disconnected regions and is kept
// distinct from malformed-input errors (see `MapError::is_no_path`).

use std::fmt;

use thiserror::Error;

use crate::types::{ConnectionId, NodeId, TypeId};

/// Boxed error from a bulk-load collaborator.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The child/parent pair behind a `MissingParent` error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentLink {
    Type { child: TypeId, parent: TypeId },
    Node { child: NodeId, parent: NodeId },
}

impl fmt::Display for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentLink::Type { child, parent } => write!(f, "{parent} of {child}"),
            ParentLink::Node { child, parent } => write!(f, "{parent} of {child}"),
        }
    }
}

/// Map engine error type.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("parent {0} is not registered")]
    MissingParent(ParentLink),

    #[error("unknown category {0}")]
    UnknownType(TypeId),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    #[error("invalid connection {id}: {reason}")]
    InvalidConnection { id: ConnectionId, reason: String },

    #[error("category {0} already exists")]
    DuplicateType(TypeId),

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("connection {0} already exists")]
    DuplicateConnection(ConnectionId),

    #[error("no path from {start} to {target}")]
    NoPathFound { start: NodeId, target: NodeId },

    #[error("map engine is not ready")]
    NotReady,

    #[error("map engine is already loading")]
    LoadInProgress,

    #[error("route search cancelled")]
    Cancelled,

    #[error("route search exceeded its deadline")]
    TimedOut,

    #[error("map source failed: {0}")]
    Source(#[source] SourceError),
}

impl MapError {
    /// True for the expected "regions are disconnected" outcome.
    pub fn is_no_path(&self) -> bool {
        matches!(self, MapError::NoPathFound { .. })
    }

    /// True when a search was aborted from outside rather than failing on
    /// its own.
    pub fn is_aborted(&self) -> bool {
        matches!(self, MapError::Cancelled | MapError::TimedOut)
    }

    pub(crate) fn missing_type_parent(child: TypeId, parent: TypeId) -> Self {
        MapError::MissingParent(ParentLink::Type { child, parent })
    }

    pub(crate) fn missing_node_parent(child: NodeId, parent: NodeId) -> Self {
        MapError::MissingParent(ParentLink::Node { child, parent })
    }

    pub(crate) fn invalid_connection(id: ConnectionId, reason: impl Into<String>) -> Self {
        MapError::InvalidConnection {
            id,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
