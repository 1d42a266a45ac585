// Route planning across the indoor and outdoor domains.
//
// `RoutePlanner` answers `navigate(start, target)` by resolving each end's
// enclosing Building (nearest Building on the way up the containment tree,
// or none for outdoor nodes) and composing single-domain A* searches
// (`pathfinding.rs`):
//
//   same building        one indoor search start → target
//   both outdoor         one outdoor search start → target
//   outdoor → building   outdoor search to every exit of the target building,
//                        keep the shortest, then indoor exit → target
//   building → outdoor   indoor start → exit, where the exit is the one with
//                        the shortest outdoor leg exit → target
//   building → building  outdoor search between every (start exit, target
//                        exit) pair, keep the shortest, then indoor legs on
//                        both sides
//
// Legs are concatenated with the shared junction node kept once.
//
// Exit candidates whose outdoor leg has no path are skipped; the call fails
// with `NoPathFound` only when no candidate works or a mandatory indoor leg
// fails. Cancellation and deadlines abort the whole call. Equal-length
// candidates resolve to the lowest exit id (or pair), so answers are
// reproducible. Candidate legs may run on the rayon pool; results are
// reduced in candidate order, so the answer does not depend on scheduling.
//
// See also: `exits.rs` for the exit index, `config.rs` for the outdoor
// filter and exit-pair policies.

use rayon::prelude::*;
use smallvec::SmallVec;

use crate::config::{ExitPairSelection, MapConfig};
use crate::error::{MapError, Result};
use crate::exits::ExitIndex;
use crate::graph::SpatialGraph;
use crate::pathfinding::{PathResult, SearchControl, SearchDomain, astar};
use crate::registry::TypeRegistry;
use crate::types::{NodeCategory, NodeId};
use wayfinder_records::RouteStep;

/// A planned route.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Ids and display names, start to target.
    pub steps: Vec<RouteStep>,
    /// Ids alone, start to target.
    pub nodes: Vec<NodeId>,
    /// Total connection distance.
    pub length: f64,
}

/// A candidate outdoor leg: `(from, to)`.
type Leg = (NodeId, NodeId);

/// Read-only view over the map used to answer one query.
#[derive(Clone, Copy)]
pub struct RoutePlanner<'a> {
    graph: &'a SpatialGraph,
    registry: &'a TypeRegistry,
    exits: &'a ExitIndex,
    config: &'a MapConfig,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(
        graph: &'a SpatialGraph,
        registry: &'a TypeRegistry,
        exits: &'a ExitIndex,
        config: &'a MapConfig,
    ) -> Self {
        Self {
            graph,
            registry,
            exits,
            config,
        }
    }

    /// Shortest route from `start` to `target`.
    pub fn navigate(&self, start: NodeId, target: NodeId, control: &SearchControl<'_>) -> Result<Route> {
        for id in [start, target] {
            if !self.graph.contains(id) {
                return Err(MapError::UnknownNode(id));
            }
        }

        let start_building = self.enclosing_building(start);
        let target_building = self.enclosing_building(target);

        let path = match (start_building, target_building) {
            (Some(sb), Some(tb)) if sb == tb => self.indoor(start, target, control)?,
            (None, None) => self.outdoor(start, target, control)?,
            (None, Some(tb)) => self.enter_building(start, target, tb, control)?,
            (Some(sb), None) => self.leave_building(start, target, sb, control)?,
            (Some(sb), Some(tb)) => self.between_buildings(start, target, sb, tb, control)?,
        };

        Ok(self.to_route(path))
    }

    /// Nearest enclosing Building of `node` (itself included).
    pub fn enclosing_building(&self, node: NodeId) -> Option<NodeId> {
        self.graph.enclosing(self.registry, node, NodeCategory::Building)
    }

    fn indoor(&self, from: NodeId, to: NodeId, control: &SearchControl<'_>) -> Result<PathResult> {
        astar(self.graph, self.registry, from, to, SearchDomain::Indoor, control)
    }

    fn outdoor(&self, from: NodeId, to: NodeId, control: &SearchControl<'_>) -> Result<PathResult> {
        let domain = SearchDomain::Outdoor(self.config.outdoor_filter);
        astar(self.graph, self.registry, from, to, domain, control)
    }

    /// Outdoor start, target inside `building`.
    fn enter_building(
        &self,
        start: NodeId,
        target: NodeId,
        building: NodeId,
        control: &SearchControl<'_>,
    ) -> Result<PathResult> {
        let legs: Vec<Leg> = self.exits.exits_of(building).map(|exit| (start, exit)).collect();
        let ((_, entrance), street) = self
            .shortest_leg(&legs, control)?
            .ok_or(MapError::NoPathFound { start, target })?;
        tracing::debug!(%start, %target, %building, %entrance, "entering building");
        let inside = self.indoor(entrance, target, control)?;
        Ok(join(street, inside))
    }

    /// Start inside `building`, outdoor target.
    fn leave_building(
        &self,
        start: NodeId,
        target: NodeId,
        building: NodeId,
        control: &SearchControl<'_>,
    ) -> Result<PathResult> {
        let legs: Vec<Leg> = self.exits.exits_of(building).map(|exit| (exit, target)).collect();
        let ((exit, _), street) = self
            .shortest_leg(&legs, control)?
            .ok_or(MapError::NoPathFound { start, target })?;
        tracing::debug!(%start, %target, %building, %exit, "leaving building");
        let inside = self.indoor(start, exit, control)?;
        Ok(join(inside, street))
    }

    /// Start and target inside different buildings.
    fn between_buildings(
        &self,
        start: NodeId,
        target: NodeId,
        start_building: NodeId,
        target_building: NodeId,
        control: &SearchControl<'_>,
    ) -> Result<PathResult> {
        let start_exits: SmallVec<[NodeId; 8]> = self.exits.exits_of(start_building).collect();
        let target_exits: SmallVec<[NodeId; 8]> = self.exits.exits_of(target_building).collect();

        let best = match self.config.exit_pair_selection {
            ExitPairSelection::FullMinimum => {
                let legs: Vec<Leg> = start_exits
                    .iter()
                    .flat_map(|&s| target_exits.iter().map(move |&t| (s, t)))
                    .collect();
                self.shortest_leg(&legs, control)?
            }
            ExitPairSelection::LastPairPerStartExit => match target_exits.last() {
                // Only the pair with the last target exit is ever compared.
                Some(&last) => {
                    let legs: Vec<Leg> = start_exits.iter().map(|&s| (s, last)).collect();
                    self.shortest_leg(&legs, control)?
                }
                None => None,
            },
        };
        let ((exit, entrance), street) = best.ok_or(MapError::NoPathFound { start, target })?;
        tracing::debug!(
            %start, %target, %start_building, %target_building, %exit, %entrance,
            "crossing between buildings"
        );

        let leaving = self.indoor(start, exit, control)?;
        let entering = self.indoor(entrance, target, control)?;
        Ok(join(join(leaving, street), entering))
    }

    /// Run the outdoor search for every candidate leg and keep the shortest.
    /// Legs with no path are skipped; `None` if none succeeds.
    fn shortest_leg(&self, legs: &[Leg], control: &SearchControl<'_>) -> Result<Option<(Leg, PathResult)>> {
        let results: Vec<Result<PathResult>> = if self.config.parallel_exit_search && legs.len() > 1 {
            legs.par_iter()
                .map(|&(from, to)| self.outdoor(from, to, control))
                .collect()
        } else {
            legs.iter()
                .map(|&(from, to)| self.outdoor(from, to, control))
                .collect()
        };

        let mut best: Option<(Leg, PathResult)> = None;
        for (&leg, result) in legs.iter().zip(results) {
            let path = match result {
                Ok(path) => path,
                Err(err) if err.is_no_path() => continue,
                Err(err) => return Err(err),
            };
            if best.as_ref().is_none_or(|(_, current)| path.length < current.length) {
                best = Some((leg, path));
            }
        }
        Ok(best)
    }

    fn to_route(&self, path: PathResult) -> Route {
        let steps = path
            .nodes
            .iter()
            .map(|&id| RouteStep {
                id,
                name: self
                    .graph
                    .node(id)
                    .map(|node| node.name.clone())
                    .unwrap_or_default(),
            })
            .collect();
        Route {
            steps,
            nodes: path.nodes,
            length: path.length,
        }
    }
}

/// Concatenate two legs that share a junction node, keeping it once.
fn join(mut first: PathResult, second: PathResult) -> PathResult {
    debug_assert_eq!(first.nodes.last(), second.nodes.first());
    first.nodes.extend(second.nodes.into_iter().skip(1));
    first.length += second.length;
    first
}
