// Single-threaded map core.
//
// `MapState` is the source of truth for one loaded map. It owns the type
// registry, the spatial graph, the exit index, and the config, and it is the
// only place that mutates them. Every mutation keeps three things in step:
//
// - the containment hierarchies (types and nodes): cascading deletes walk
//   subtrees children-first with an explicit stack (`subtree_post_order`);
// - adjacency: connections are linked into and unlinked from both ends;
// - the exit index: each mutation re-derives membership for exactly the
//   nodes whose exit status could have changed (`ExitIndex::refresh`).
//
// `MapState` has no internal locking. Concurrency is imposed from outside by
// `MapEngine` (`engine.rs`), which wraps it in a read-write lock. Queries go
// through `navigate`, which borrows the state immutably for the duration of
// the search.
//
// See also: `load.rs` for building a `MapState` from a bulk load,
// `planner.rs` for route composition.

use serde::Serialize;
use wayfinder_records::{CategoryRecord, ConnectionRecord, MapChange, NodeRecord};

use crate::config::MapConfig;
use crate::error::{MapError, Result};
use crate::exits::ExitIndex;
use crate::graph::SpatialGraph;
use crate::pathfinding::SearchControl;
use crate::planner::{Route, RoutePlanner};
use crate::registry::TypeRegistry;
use crate::types::{ConnectionId, NodeCategory, NodeId, Position, TypeId};

/// Entity counts, for logs and health checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MapStats {
    pub types: usize,
    pub nodes: usize,
    pub connections: usize,
    pub buildings_with_exits: usize,
    pub exits: usize,
}

/// The loaded map.
#[derive(Clone, Debug)]
pub struct MapState {
    config: MapConfig,
    registry: TypeRegistry,
    graph: SpatialGraph,
    exits: ExitIndex,
}

impl MapState {
    pub fn new(config: MapConfig) -> Self {
        let registry = TypeRegistry::new(config.categories.clone());
        Self {
            config,
            registry,
            graph: SpatialGraph::new(),
            exits: ExitIndex::new(),
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn graph(&self) -> &SpatialGraph {
        &self.graph
    }

    pub fn exits(&self) -> &ExitIndex {
        &self.exits
    }

    pub fn stats(&self) -> MapStats {
        MapStats {
            types: self.registry.len(),
            nodes: self.graph.node_count(),
            connections: self.graph.connection_count(),
            buildings_with_exits: self.exits.building_count(),
            exits: self.exits.exit_count(),
        }
    }

    /// Drop every type, node, connection, and exit.
    pub fn clear(&mut self) {
        self.exits.clear();
        self.graph.clear();
        self.registry.clear();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn planner(&self) -> RoutePlanner<'_> {
        RoutePlanner::new(&self.graph, &self.registry, &self.exits, &self.config)
    }

    /// Shortest route from `start` to `target`.
    pub fn navigate(&self, start: NodeId, target: NodeId, control: &SearchControl<'_>) -> Result<Route> {
        self.planner().navigate(start, target, control)
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub fn add_type(&mut self, id: TypeId, parent: Option<TypeId>, name: &str) -> Result<()> {
        self.registry.add_type(id, parent, name)?;
        tracing::debug!(%id, name, "category added");
        Ok(())
    }

    /// Rename a category. If the rename moves it into or out of Building or
    /// Street, exit membership may have changed anywhere, so the index is
    /// rebuilt.
    pub fn change_type(&mut self, id: TypeId, name: &str) -> Result<()> {
        let (before, after) = self.registry.rename_type(id, name)?;
        if before != after && (before.affects_exits() || after.affects_exits()) {
            self.exits.rebuild(&self.graph, &self.registry);
            tracing::debug!(%id, name, ?before, ?after, "category reclassified; exits rebuilt");
        } else {
            tracing::debug!(%id, name, "category renamed");
        }
        Ok(())
    }

    /// Delete a category, its subcategories (children first), and every
    /// node of those categories (with their own descendants).
    pub fn delete_type(&mut self, id: TypeId) -> Result<()> {
        for type_id in self.registry.subtree_post_order(id)? {
            let nodes: Vec<NodeId> = self
                .registry
                .get(type_id)
                .map(|t| t.nodes.iter().copied().collect())
                .unwrap_or_default();
            for node in nodes {
                // May already be gone as a descendant of an earlier node.
                if self.graph.contains(node) {
                    self.delete_node(node)?;
                }
            }
            self.registry.remove_type(type_id)?;
        }
        tracing::debug!(%id, "category deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    pub fn add_node(
        &mut self,
        id: NodeId,
        type_id: TypeId,
        parent: Option<NodeId>,
        position: Position,
        name: &str,
    ) -> Result<()> {
        if !self.registry.contains(type_id) {
            return Err(MapError::UnknownType(type_id));
        }
        self.graph.add_node(id, type_id, parent, position, name)?;
        self.registry.attach_node(type_id, id)?;
        tracing::debug!(%id, %type_id, name, "node added");
        Ok(())
    }

    /// Change a node's category and position. Parent and depth stay put.
    pub fn change_node(&mut self, id: NodeId, type_id: TypeId, position: Position) -> Result<()> {
        if !self.graph.contains(id) {
            return Err(MapError::UnknownNode(id));
        }
        if !self.registry.contains(type_id) {
            return Err(MapError::UnknownType(type_id));
        }
        let previous = self.graph.update_node(id, type_id, position)?;
        if previous != type_id {
            self.registry.detach_node(previous, id);
            self.registry.attach_node(type_id, id)?;
        }

        let before = self.registry.category(previous);
        let after = self.registry.category(type_id);
        if before != after {
            self.reindex_after_recategorize(id, before, after)?;
        }
        tracing::debug!(%id, %type_id, %position, "node updated");
        Ok(())
    }

    /// Exit membership after `id` moved from category `before` to `after`.
    fn reindex_after_recategorize(&mut self, id: NodeId, before: NodeCategory, after: NodeCategory) -> Result<()> {
        let building_changed = before == NodeCategory::Building || after == NodeCategory::Building;
        let street_changed = before == NodeCategory::Street || after == NodeCategory::Street;

        if building_changed {
            // Every descendant may now resolve to a different building.
            for node in self.graph.subtree_post_order(id)? {
                self.exits.refresh(&self.graph, &self.registry, node);
            }
        } else {
            self.exits.refresh(&self.graph, &self.registry, id);
        }
        if street_changed {
            // Neighbours gained or lost a street neighbour.
            for (neighbor, _) in self.graph.neighbors(id) {
                self.exits.refresh(&self.graph, &self.registry, neighbor);
            }
        }
        Ok(())
    }

    /// Delete a node, all of its descendants (children first), and every
    /// connection incident to any of them.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        for node_id in self.graph.subtree_post_order(id)? {
            let incident: Vec<(ConnectionId, NodeId)> = self
                .graph
                .node(node_id)
                .map(|node| node.adjacency.iter().map(|(&nb, &conn)| (conn, nb)).collect())
                .unwrap_or_default();
            for (conn, neighbor) in incident {
                self.delete_connection(conn, node_id, neighbor)?;
            }
            self.exits.remove_exit(node_id);
            self.exits.remove_building(node_id);
            let removed = self.graph.remove_node(node_id)?;
            self.registry.detach_node(removed.type_id, node_id);
        }
        tracing::debug!(%id, "node deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    pub fn add_connection(
        &mut self,
        id: ConnectionId,
        a: NodeId,
        b: NodeId,
        distance: f64,
        time: f64,
        weight: f64,
    ) -> Result<()> {
        self.graph.add_connection(id, a, b, distance, time, weight)?;

        let a_street = self.graph.category(&self.registry, a) == NodeCategory::Street;
        let b_street = self.graph.category(&self.registry, b) == NodeCategory::Street;
        match (a_street, b_street) {
            (true, false) => self.exits.refresh(&self.graph, &self.registry, b),
            (false, true) => self.exits.refresh(&self.graph, &self.registry, a),
            _ => {}
        }
        tracing::debug!(%id, %a, %b, distance, "connection added");
        Ok(())
    }

    pub fn change_connection(&mut self, id: ConnectionId, distance: f64, time: f64, weight: f64) -> Result<()> {
        self.graph.update_connection(id, distance, time, weight)?;
        tracing::debug!(%id, distance, "connection updated");
        Ok(())
    }

    /// Delete a connection. An endpoint that was an exit only because of
    /// this connection stops being one.
    pub fn delete_connection(&mut self, id: ConnectionId, a: NodeId, b: NodeId) -> Result<()> {
        let removed = self.graph.remove_connection(id, a, b)?;
        self.exits.refresh(&self.graph, &self.registry, removed.a);
        self.exits.refresh(&self.graph, &self.registry, removed.b);
        tracing::debug!(%id, a = %removed.a, b = %removed.b, "connection deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Records and change notifications
    // -----------------------------------------------------------------------

    pub fn add_category_record(&mut self, record: &CategoryRecord) -> Result<()> {
        self.add_type(record.id, record.parent_id, &record.name)
    }

    pub fn add_node_record(&mut self, record: &NodeRecord) -> Result<()> {
        self.add_node(
            record.id,
            record.type_id,
            record.parent_id,
            Position::new(record.x, record.y, record.z),
            &record.name,
        )
    }

    pub fn add_connection_record(&mut self, record: &ConnectionRecord) -> Result<()> {
        self.add_connection(
            record.id,
            record.node_a,
            record.node_b,
            record.distance,
            record.time,
            record.weight,
        )
    }

    /// Apply one committed persistent change.
    pub fn apply(&mut self, change: &MapChange) -> Result<()> {
        match change {
            MapChange::CategoryCreated(record) => self.add_category_record(record),
            MapChange::CategoryRenamed { id, name } => self.change_type(*id, name),
            MapChange::CategoryDeleted { id } => self.delete_type(*id),
            MapChange::NodeCreated(record) => self.add_node_record(record),
            MapChange::NodeUpdated { id, type_id, x, y, z } => {
                self.change_node(*id, *type_id, Position::new(*x, *y, *z))
            }
            MapChange::NodeDeleted { id } => self.delete_node(*id),
            MapChange::ConnectionCreated(record) => self.add_connection_record(record),
            MapChange::ConnectionUpdated {
                id,
                distance,
                time,
                weight,
            } => self.change_connection(*id, *distance, *time, *weight),
            MapChange::ConnectionDeleted { id, node_a, node_b } => {
                self.delete_connection(*id, *node_a, *node_b)
            }
        }
    }
}
