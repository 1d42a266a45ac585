// Bulk loading a map from a record source.
//
// `MapSource` is the seam to whatever holds the persisted map: a database
// adapter in production, a `MapSnapshot` (JSON) in tests and tools. Loading
// builds a fresh `MapState` off to the side; the engine swaps it in only
// once the whole load has succeeded.
//
// Sources may return records in any order. Categories and nodes are sorted
// parents-first before insertion so a child never arrives ahead of its
// parent. Records whose parent is absent from the batch (or that sit on a
// parent cycle) are inserted last and fail with `MissingParent`.
// Connections are gathered per node, so each one is usually seen from both
// ends; a connection id already present is skipped.

use std::collections::{BTreeMap, BTreeSet};

use wayfinder_records::{CategoryRecord, ConnectionRecord, MapSnapshot, NodeRecord};

use crate::config::MapConfig;
use crate::error::{MapError, Result, SourceError};
use crate::map::MapState;
use crate::types::NodeId;

/// Read access to a persisted map.
pub trait MapSource {
    fn categories(&self) -> std::result::Result<Vec<CategoryRecord>, SourceError>;

    fn nodes(&self) -> std::result::Result<Vec<NodeRecord>, SourceError>;

    /// Every connection with `node` as either endpoint.
    fn connections_of(&self, node: NodeId) -> std::result::Result<Vec<ConnectionRecord>, SourceError>;
}

impl MapSource for MapSnapshot {
    fn categories(&self) -> std::result::Result<Vec<CategoryRecord>, SourceError> {
        Ok(self.categories.clone())
    }

    fn nodes(&self) -> std::result::Result<Vec<NodeRecord>, SourceError> {
        Ok(self.nodes.clone())
    }

    fn connections_of(&self, node: NodeId) -> std::result::Result<Vec<ConnectionRecord>, SourceError> {
        Ok(MapSnapshot::connections_of(self, node).cloned().collect())
    }
}

/// Build a complete `MapState` from `source`.
pub fn load(source: &dyn MapSource, config: MapConfig) -> Result<MapState> {
    let mut state = MapState::new(config);

    let categories = source.categories().map_err(MapError::Source)?;
    for record in parents_first(categories, |c| c.id, |c| c.parent_id) {
        state.add_category_record(&record)?;
    }

    let nodes = parents_first(source.nodes().map_err(MapError::Source)?, |n| n.id, |n| n.parent_id);
    for record in &nodes {
        state.add_node_record(record)?;
    }

    let mut skipped = 0usize;
    for record in &nodes {
        for connection in source.connections_of(record.id).map_err(MapError::Source)? {
            if state.graph().connection(connection.id).is_some() {
                skipped += 1;
                continue;
            }
            state.add_connection_record(&connection)?;
        }
    }

    let stats = state.stats();
    tracing::debug!(?stats, duplicate_connections = skipped, "map loaded from source");
    Ok(state)
}

/// Reorder `records` so every record follows its parent. Siblings keep
/// their input order.
fn parents_first<T, K>(records: Vec<T>, key: impl Fn(&T) -> K, parent: impl Fn(&T) -> Option<K>) -> Vec<T>
where
    K: Ord + Copy,
{
    let present: BTreeSet<K> = records.iter().map(&key).collect();
    let mut children: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    let mut roots = Vec::new();
    for (i, record) in records.iter().enumerate() {
        match parent(record) {
            Some(p) if present.contains(&p) => children.entry(p).or_default().push(i),
            _ => roots.push(i),
        }
    }

    let mut placed = vec![false; records.len()];
    let mut order = Vec::with_capacity(records.len());
    let mut stack: Vec<usize> = roots.into_iter().rev().collect();
    while let Some(i) = stack.pop() {
        if placed[i] {
            continue;
        }
        placed[i] = true;
        order.push(i);
        if let Some(kids) = children.get(&key(&records[i])) {
            stack.extend(kids.iter().rev());
        }
    }
    // Unreachable from any root: a parent cycle.
    order.extend((0..records.len()).filter(|&i| !placed[i]));

    let mut slots: Vec<Option<T>> = records.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}
