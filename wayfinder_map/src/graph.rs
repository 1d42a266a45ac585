// Spatial graph: hierarchical nodes joined by undirected weighted
// connections.
//
// Nodes form a containment forest (campus → building → floor → room) through
// `parent`/`children` links, and a routing graph through `adjacency`. Every
// link is an id resolved through this graph's maps; no node owns another.
//
// Each connection is stored once in `connections` and referenced by id from
// both endpoints' adjacency maps, so a cost update is visible from either
// side without touching adjacency. Adjacency is keyed by neighbour id, which
// means at most one connection per node pair; a second one is rejected.
//
// Deletion here is shallow (`remove_node`, `remove_connection`). Cascades
// (descendants first, then incident connections) are driven by `map.rs`,
// which also keeps the exit index in step.
//
// See also: `registry.rs` for node types and categories, `pathfinding.rs`
// for A* over this graph, `exits.rs` for the building exit index.
//
// Maps are `BTreeMap` so neighbour expansion order, and therefore every
// search result, is deterministic.

use std::collections::BTreeMap;

use crate::error::{MapError, Result};
use crate::registry::TypeRegistry;
use crate::types::{ConnectionId, NodeCategory, NodeId, Position, TypeId};

/// A spatial entity: a building, room, door, street segment, ...
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub type_id: TypeId,
    pub name: String,
    pub position: Position,
    pub parent: Option<NodeId>,
    /// 1 for roots, otherwise `parent.depth + 1`.
    pub depth: u32,
    pub children: Vec<NodeId>,
    /// Neighbour id → the connection joining them.
    pub adjacency: BTreeMap<NodeId, ConnectionId>,
}

/// An undirected edge. `distance` is the routing cost; `time` and `weight`
/// are carried for alternative cost functions and not read by the router.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub a: NodeId,
    pub b: NodeId,
    pub distance: f64,
    pub time: f64,
    pub weight: f64,
}

impl Connection {
    /// Whether this connection joins exactly `x` and `y`, in either order.
    pub fn joins(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

/// The graph container.
#[derive(Clone, Debug, Default)]
pub struct SpatialGraph {
    nodes: BTreeMap<NodeId, Node>,
    connections: BTreeMap<ConnectionId, Connection>,
}

impl SpatialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// Add a node. The parent, if any, must already exist; depth follows
    /// from it. The caller is responsible for checking `type_id`.
    pub fn add_node(
        &mut self,
        id: NodeId,
        type_id: TypeId,
        parent: Option<NodeId>,
        position: Position,
        name: &str,
    ) -> Result<()> {
        if self.nodes.contains_key(&id) {
            return Err(MapError::DuplicateNode(id));
        }
        let depth = match parent {
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get_mut(&parent_id)
                    .ok_or_else(|| MapError::missing_node_parent(id, parent_id))?;
                parent_node.children.push(id);
                parent_node.depth + 1
            }
            None => 1,
        };
        self.nodes.insert(
            id,
            Node {
                id,
                type_id,
                name: name.to_owned(),
                position,
                parent,
                depth,
                children: Vec::new(),
                adjacency: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Change a node's type and position. Parent and depth are untouched.
    /// Returns the previous type.
    pub fn update_node(&mut self, id: NodeId, type_id: TypeId, position: Position) -> Result<TypeId> {
        let node = self.nodes.get_mut(&id).ok_or(MapError::UnknownNode(id))?;
        let previous = node.type_id;
        node.type_id = type_id;
        node.position = position;
        Ok(previous)
    }

    /// `id` followed by all of its descendants, children before parents.
    pub fn subtree_post_order(&self, id: NodeId) -> Result<Vec<NodeId>> {
        if !self.nodes.contains_key(&id) {
            return Err(MapError::UnknownNode(id));
        }
        let mut order = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            stack.push((current, true));
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev().map(|&child| (child, false)));
            }
        }
        Ok(order)
    }

    /// Remove a single node and detach it from its parent. Children and
    /// incident connections must already be gone.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        let removed = self.nodes.remove(&id).ok_or(MapError::UnknownNode(id))?;
        debug_assert!(removed.children.is_empty(), "{id} removed before its children");
        debug_assert!(removed.adjacency.is_empty(), "{id} removed with live connections");
        if let Some(parent) = removed.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|child| *child != id);
        }
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Add a connection and link it into both endpoints' adjacency.
    pub fn add_connection(
        &mut self,
        id: ConnectionId,
        a: NodeId,
        b: NodeId,
        distance: f64,
        time: f64,
        weight: f64,
    ) -> Result<()> {
        if self.connections.contains_key(&id) {
            return Err(MapError::DuplicateConnection(id));
        }
        if a == b {
            return Err(MapError::invalid_connection(id, format!("self-loop on {a}")));
        }
        validate_distance(id, distance)?;
        let node_a = self.nodes.get(&a).ok_or(MapError::UnknownNode(a))?;
        if !self.nodes.contains_key(&b) {
            return Err(MapError::UnknownNode(b));
        }
        if let Some(existing) = node_a.adjacency.get(&b) {
            return Err(MapError::invalid_connection(
                id,
                format!("{a} and {b} are already joined by {existing}"),
            ));
        }

        self.connections.insert(
            id,
            Connection {
                id,
                a,
                b,
                distance,
                time,
                weight,
            },
        );
        if let Some(node) = self.nodes.get_mut(&a) {
            node.adjacency.insert(b, id);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.adjacency.insert(a, id);
        }
        Ok(())
    }

    /// Update a connection's costs in place.
    pub fn update_connection(&mut self, id: ConnectionId, distance: f64, time: f64, weight: f64) -> Result<()> {
        validate_distance(id, distance)?;
        let conn = self
            .connections
            .get_mut(&id)
            .ok_or(MapError::UnknownConnection(id))?;
        conn.distance = distance;
        conn.time = time;
        conn.weight = weight;
        Ok(())
    }

    /// Unlink a connection from both endpoints and discard it. `a`/`b` must
    /// name its endpoints (either order).
    pub fn remove_connection(&mut self, id: ConnectionId, a: NodeId, b: NodeId) -> Result<Connection> {
        let conn = self
            .connections
            .get(&id)
            .ok_or(MapError::UnknownConnection(id))?;
        if !conn.joins(a, b) {
            return Err(MapError::invalid_connection(
                id,
                format!("joins {} and {}, not {a} and {b}", conn.a, conn.b),
            ));
        }
        let (a, b) = (conn.a, conn.b);
        if let Some(node) = self.nodes.get_mut(&a) {
            node.adjacency.remove(&b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.adjacency.remove(&a);
        }
        self.connections
            .remove(&id)
            .ok_or(MapError::UnknownConnection(id))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Neighbours of `id` with the connection reaching each, in neighbour id
    /// order. Empty for unknown nodes.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Connection)> {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|node| node.adjacency.iter())
            .filter_map(move |(&neighbor, conn_id)| {
                self.connections.get(conn_id).map(|conn| (neighbor, conn))
            })
    }

    /// Walk parent links starting at `id` itself.
    pub fn lineage(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        std::iter::successors(self.nodes.get(&id), move |node| {
            node.parent.and_then(|p| self.nodes.get(&p))
        })
    }

    /// Category of a node through its type; unknown nodes are `Other`.
    pub fn category(&self, registry: &TypeRegistry, id: NodeId) -> NodeCategory {
        self.nodes
            .get(&id)
            .map_or(NodeCategory::Other, |node| registry.category(node.type_id))
    }

    /// The nearest node of `category` on the way up from `id`, including
    /// `id` itself. `None` when the root is reached without a match.
    pub fn enclosing(&self, registry: &TypeRegistry, id: NodeId, category: NodeCategory) -> Option<NodeId> {
        self.lineage(id)
            .find(|node| registry.category(node.type_id) == category)
            .map(|node| node.id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
    }
}

fn validate_distance(id: ConnectionId, distance: f64) -> Result<()> {
    if distance.is_finite() && distance >= 0.0 {
        Ok(())
    } else {
        Err(MapError::invalid_connection(
            id,
            format!("distance must be finite and non-negative, got {distance}"),
        ))
    }
}
