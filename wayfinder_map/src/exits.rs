// Building exit index.
//
// An exit is a node that is not a Street but has at least one direct
// connection to a Street node. Each exit is attributed to its enclosing
// Building: the nearest node of category Building found by walking parent
// links up from the exit (the exit itself included). Nodes with no enclosing
// Building are outdoor features and are never indexed.
//
// The planner uses the index to stitch routes across domains: an indoor leg
// runs to one of a building's exits, the outdoor leg runs street-to-street
// from there.
//
// Membership is a derived fact, so instead of patching sets by hand each
// mutation calls `refresh` for the nodes whose membership may have changed
// (see `map.rs`). `refresh` removes stale entries as well as adding new
// ones, which keeps the index correct across connection and node deletes.
// A reverse map (exit → building) makes removal logarithmic.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::SpatialGraph;
use crate::registry::TypeRegistry;
use crate::types::{NodeCategory, NodeId};

/// Per-building sets of exit nodes.
#[derive(Clone, Debug, Default)]
pub struct ExitIndex {
    by_building: BTreeMap<NodeId, BTreeSet<NodeId>>,
    building_of: BTreeMap<NodeId, NodeId>,
}

impl ExitIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `exit` under `building`. Adding an existing entry is a no-op.
    /// An exit re-attributed to a different building moves there.
    pub fn insert(&mut self, building: NodeId, exit: NodeId) -> bool {
        if self.building_of.get(&exit) == Some(&building) {
            return false;
        }
        self.remove_exit(exit);
        self.building_of.insert(exit, building);
        self.by_building.entry(building).or_default().insert(exit);
        true
    }

    /// Drop `exit` from whichever building lists it. Returns that building.
    pub fn remove_exit(&mut self, exit: NodeId) -> Option<NodeId> {
        let building = self.building_of.remove(&exit)?;
        if let Some(set) = self.by_building.get_mut(&building) {
            set.remove(&exit);
            if set.is_empty() {
                self.by_building.remove(&building);
            }
        }
        Some(building)
    }

    /// Drop a building and all of its exits.
    pub fn remove_building(&mut self, building: NodeId) {
        if let Some(exits) = self.by_building.remove(&building) {
            for exit in exits {
                self.building_of.remove(&exit);
            }
        }
    }

    /// Re-derive `node`'s membership from the current graph.
    pub fn refresh(&mut self, graph: &SpatialGraph, registry: &TypeRegistry, node: NodeId) {
        match exit_building(graph, registry, node) {
            Some(building) => {
                if self.insert(building, node) {
                    tracing::debug!(%node, %building, "exit indexed");
                }
            }
            None => {
                if let Some(building) = self.remove_exit(node) {
                    tracing::debug!(%node, %building, "exit dropped");
                }
            }
        }
    }

    /// Throw the index away and derive it again for every node.
    pub fn rebuild(&mut self, graph: &SpatialGraph, registry: &TypeRegistry) {
        self.clear();
        for node in graph.nodes() {
            if let Some(building) = exit_building(graph, registry, node.id) {
                self.insert(building, node.id);
            }
        }
    }

    /// Exits of `building` in id order; empty if it has none.
    pub fn exits_of(&self, building: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.by_building
            .get(&building)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn building_of(&self, exit: NodeId) -> Option<NodeId> {
        self.building_of.get(&exit).copied()
    }

    pub fn is_exit(&self, node: NodeId) -> bool {
        self.building_of.contains_key(&node)
    }

    pub fn building_count(&self) -> usize {
        self.by_building.len()
    }

    pub fn exit_count(&self) -> usize {
        self.building_of.len()
    }

    pub fn clear(&mut self) {
        self.by_building.clear();
        self.building_of.clear();
    }
}

/// The building `node` is an exit of, or `None` if it does not qualify:
/// it must exist, not be a Street, touch a Street, and sit inside a Building.
pub fn exit_building(graph: &SpatialGraph, registry: &TypeRegistry, node: NodeId) -> Option<NodeId> {
    if !graph.contains(node) || graph.category(registry, node) == NodeCategory::Street {
        return None;
    }
    let touches_street = graph
        .neighbors(node)
        .any(|(neighbor, _)| graph.category(registry, neighbor) == NodeCategory::Street);
    if !touches_street {
        return None;
    }
    graph.enclosing(registry, node, NodeCategory::Building)
}
