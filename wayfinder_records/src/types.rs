// Core ID types for the campus map.
//
// Lightweight newtypes over the persistence layer's integer keys. They are
// used by the records in `records.rs`, the mutation notifications in
// `change.rs`, and throughout the engine crate (`wayfinder_map`). Ordering
// matters: every deterministic tie-break in the engine compares these ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a category (node type) row, e.g. "Building" or "Room".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u64);

/// Key of a spatial node row (a building, room, door, street segment...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Key of a connection row joining two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}
