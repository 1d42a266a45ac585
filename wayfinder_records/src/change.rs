// Mutation notifications from the persistence layer.
//
// Every committed create/update/delete of a category, node, or connection is
// reported to the engine as one `MapChange`. The engine trusts that the
// change is already durable and validated against business rules; it only
// re-checks its own structural invariants (missing parent, unknown id,
// self-loop).
//
// Changes are applied strictly in arrival order, either directly through
// `MapEngine::apply` or via the background change-feed worker (both in
// `wayfinder_map`).

use serde::{Deserialize, Serialize};

use crate::records::{CategoryRecord, ConnectionRecord, NodeRecord};
use crate::types::{ConnectionId, NodeId, TypeId};

/// A single committed change to the persistent map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MapChange {
    /// A new category was created.
    CategoryCreated(CategoryRecord),
    /// A category was renamed. Renames can change which categories count as
    /// "Building" / "Street" / "Door" / "Elevator".
    CategoryRenamed { id: TypeId, name: String },
    /// A category was deleted, together with its subcategories and every
    /// node of those categories.
    CategoryDeleted { id: TypeId },
    /// A new node was created.
    NodeCreated(NodeRecord),
    /// A node's category or position changed. Parent and depth are fixed.
    NodeUpdated {
        id: NodeId,
        type_id: TypeId,
        x: f64,
        y: f64,
        z: f64,
    },
    /// A node was deleted, together with its descendants and every incident
    /// connection.
    NodeDeleted { id: NodeId },
    /// A new connection was created.
    ConnectionCreated(ConnectionRecord),
    /// A connection's costs changed.
    ConnectionUpdated {
        id: ConnectionId,
        distance: f64,
        time: f64,
        weight: f64,
    },
    /// A connection was deleted.
    ConnectionDeleted {
        id: ConnectionId,
        node_a: NodeId,
        node_b: NodeId,
    },
}

impl MapChange {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MapChange::CategoryCreated(_) => "category_created",
            MapChange::CategoryRenamed { .. } => "category_renamed",
            MapChange::CategoryDeleted { .. } => "category_deleted",
            MapChange::NodeCreated(_) => "node_created",
            MapChange::NodeUpdated { .. } => "node_updated",
            MapChange::NodeDeleted { .. } => "node_deleted",
            MapChange::ConnectionCreated(_) => "connection_created",
            MapChange::ConnectionUpdated { .. } => "connection_updated",
            MapChange::ConnectionDeleted { .. } => "connection_deleted",
        }
    }
}
