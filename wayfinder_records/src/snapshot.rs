// A full bulk load held in memory.
//
// `MapSnapshot` is the simplest producer of startup data: all category,
// node, and connection rows in three vectors. The engine crate implements
// its `MapSource` trait for it, so a snapshot can seed a `MapEngine`
// directly (tests, fixtures, offline tools). Rows may appear in any order;
// the engine's loader sorts parents before children.

use serde::{Deserialize, Serialize};

use crate::records::{CategoryRecord, ConnectionRecord, NodeRecord};
use crate::types::NodeId;

/// Every row of the persistent map at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

impl MapSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Connections with `node` as either endpoint, in storage order.
    pub fn connections_of(&self, node: NodeId) -> impl Iterator<Item = &ConnectionRecord> {
        self.connections
            .iter()
            .filter(move |c| c.node_a == node || c.node_b == node)
    }
}
