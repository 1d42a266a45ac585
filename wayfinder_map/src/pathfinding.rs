// A* search over the spatial graph, restricted to one routing domain.
//
// Two domains share one implementation and differ only in which neighbours
// may be entered:
// - `Indoor`: anything except Street and Elevator nodes. Vertical routing
//   through elevators is not supported.
// - `Outdoor`: Street and Door nodes under the default `StreetOrDoor`
//   filter, or anything under the legacy `Unrestricted` filter.
// In both domains the search's own target is always admitted, so a route
// can end on a node it could not pass through (an exit room next to the
// street, an elevator lobby).
//
// g is the accumulated connection distance; h is the straight-line 3D
// distance to the target, admissible (and consistent) as long as every
// connection is at least as long as the straight line between its ends.
// The open set is an indexed heap (`open_set.rs`): a neighbour already
// queued is updated in place when reached more cheaply.
//
// Every pop first checks the `SearchControl`, so a caller can abort a long
// search through a `CancelToken` or a deadline.
//
// See also: `planner.rs` which composes indoor and outdoor legs, `graph.rs`
// for the graph being searched.

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::config::OutdoorFilter;
use crate::error::{MapError, Result};
use crate::graph::SpatialGraph;
use crate::open_set::{OpenEntry, OpenSet};
use crate::registry::TypeRegistry;
use crate::types::{NodeCategory, NodeId};

/// Which part of the map a single search may traverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchDomain {
    Indoor,
    Outdoor(OutdoorFilter),
}

impl SearchDomain {
    /// Whether a search in this domain may step onto a node of `category`.
    pub fn admits(self, category: NodeCategory) -> bool {
        match self {
            SearchDomain::Indoor => {
                !matches!(category, NodeCategory::Street | NodeCategory::Elevator)
            }
            SearchDomain::Outdoor(OutdoorFilter::StreetOrDoor) => {
                matches!(category, NodeCategory::Street | NodeCategory::Door)
            }
            SearchDomain::Outdoor(OutdoorFilter::Unrestricted) => true,
        }
    }
}

/// The result of a successful search.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    /// Node ids from start to target, both inclusive.
    pub nodes: Vec<NodeId>,
    /// Sum of connection distances along `nodes`.
    pub length: f64,
}

/// Shared flag a caller flips to abort searches in flight.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Abort conditions checked at every open-set pop.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchControl<'a> {
    pub cancel: Option<&'a CancelToken>,
    /// Owner-wide stop flag, set while the map is being torn down.
    pub halt: Option<&'a AtomicBool>,
    pub deadline: Option<Instant>,
}

impl<'a> SearchControl<'a> {
    /// Never aborts.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(cancel: Option<&'a CancelToken>, deadline: Option<Instant>) -> Self {
        Self {
            cancel,
            halt: None,
            deadline,
        }
    }

    pub fn with_halt(mut self, halt: &'a AtomicBool) -> Self {
        self.halt = Some(halt);
        self
    }

    pub fn check(&self) -> Result<()> {
        if self.cancel.is_some_and(CancelToken::is_cancelled)
            || self.halt.is_some_and(|halt| halt.load(Ordering::Relaxed))
        {
            return Err(MapError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(MapError::TimedOut);
        }
        Ok(())
    }
}

/// Find the shortest path from `start` to `target` within `domain`.
///
/// Fails with `UnknownNode` if either end is missing, `NoPathFound` if the
/// open set runs dry, and `Cancelled`/`TimedOut` if `control` trips.
pub fn astar(
    graph: &SpatialGraph,
    registry: &TypeRegistry,
    start: NodeId,
    target: NodeId,
    domain: SearchDomain,
    control: &SearchControl<'_>,
) -> Result<PathResult> {
    let start_pos = graph.node(start).ok_or(MapError::UnknownNode(start))?.position;
    let target_pos = graph.node(target).ok_or(MapError::UnknownNode(target))?.position;

    let mut open = OpenSet::new();
    let mut came_from: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    let mut closed: FxHashSet<NodeId> = FxHashSet::default();

    open.push(OpenEntry {
        node: start,
        g: 0.0,
        h: start_pos.distance_to(target_pos),
    });

    while let Some(current) = open.pop() {
        control.check()?;

        if current.node == target {
            tracing::trace!(%start, %target, expanded = closed.len(), "search reached target");
            return Ok(PathResult {
                nodes: reconstruct_path(&came_from, start, target),
                length: current.g,
            });
        }
        closed.insert(current.node);

        for (neighbor, conn) in graph.neighbors(current.node) {
            if closed.contains(&neighbor) {
                continue;
            }
            if neighbor != target && !domain.admits(graph.category(registry, neighbor)) {
                continue;
            }

            let tentative_g = current.g + conn.distance;
            if open.contains(neighbor) {
                if open.decrease_key(neighbor, tentative_g) {
                    came_from.insert(neighbor, current.node);
                }
            } else if let Some(node) = graph.node(neighbor) {
                open.push(OpenEntry {
                    node: neighbor,
                    g: tentative_g,
                    h: node.position.distance_to(target_pos),
                });
                came_from.insert(neighbor, current.node);
            }
        }
    }

    tracing::trace!(%start, %target, expanded = closed.len(), "search exhausted");
    Err(MapError::NoPathFound { start, target })
}

/// Follow back-pointers from `target` to `start` and reverse.
fn reconstruct_path(came_from: &FxHashMap<NodeId, NodeId>, start: NodeId, target: NodeId) -> Vec<NodeId> {
    let mut nodes = vec![target];
    let mut current = target;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                nodes.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    nodes.reverse();
    nodes
}
