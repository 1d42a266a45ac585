// Bulk-load records and the navigate answer row.
//
// The persistence layer hands the engine three kinds of rows at startup:
// categories, nodes, and connections. Each carries the same fields the
// engine keeps in memory (see `wayfinder_map::registry` and
// `wayfinder_map::graph`). Descriptive fields the engine does not route on
// (`shortname`, `description`) are optional and default to `None` so lean
// producers can omit them.
//
// `RouteStep` goes the other way: it is one row of a `navigate` answer,
// shaped for the request layer's `{"route": [{"id", "name"}, ...]}` reply.

use serde::{Deserialize, Serialize};

use crate::types::{ConnectionId, NodeId, TypeId};

/// A category in the type tree ("Building", "Street", "Room", ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: TypeId,
    #[serde(default)]
    pub parent_id: Option<TypeId>,
    pub name: String,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A spatial entity. Coordinates share the unit system of connection
/// distances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    pub type_id: TypeId,
    pub name: String,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// An undirected weighted edge between two nodes.
///
/// `distance` is the routing cost and must be at least the straight-line
/// distance between the endpoints for route search to stay optimal. `time`
/// and `weight` are carried through for other cost functions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: ConnectionId,
    pub node_a: NodeId,
    pub node_b: NodeId,
    pub distance: f64,
    pub time: f64,
    pub weight: f64,
}

/// One hop of a planned route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStep {
    pub id: NodeId,
    pub name: String,
}
