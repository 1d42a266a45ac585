// wayfinder_map — in-memory campus map and route engine.
//
// This crate holds a campus map (categories, a containment hierarchy of
// nodes, weighted connections) in memory and answers shortest-route queries
// that may cross between building interiors and outdoor streets. It is kept
// in sync with a persistent store through incremental change notifications.
// It has no I/O of its own: the persistence layer plugs in through the
// `MapSource` trait and the `MapChange` channel.
//
// Module overview:
// - `engine.rs`:      MapEngine — lifecycle, read-write locking, the public facade.
// - `feed.rs`:        Change-notification worker applying `MapChange`s from a channel.
// - `load.rs`:        MapSource trait + parents-first bulk load.
// - `map.rs`:         MapState — the single-threaded core and all mutation cascades.
// - `planner.rs`:     RoutePlanner — composes indoor and outdoor legs through exits.
// - `pathfinding.rs`: Domain-filtered A* with cancellation and deadlines.
// - `open_set.rs`:    Indexed binary heap with decrease-key for A*.
// - `exits.rs`:       ExitIndex — which nodes connect each building to the street.
// - `graph.rs`:       SpatialGraph — nodes, containment, adjacency.
// - `registry.rs`:    TypeRegistry — category hierarchy and per-type node sets.
// - `config.rs`:      MapConfig — category names, search policy, timeouts.
// - `error.rs`:       MapError and the crate Result alias.
// - `types.rs`:       Position, NodeCategory, id re-exports.
//
// Design decisions:
// - **Ordered collections for determinism.** Nodes, connections, and exits
//   live in `BTreeMap`/`BTreeSet`, so iteration order (and therefore search
//   tie-breaking) depends only on ids. Hash maps appear only in per-search
//   scratch state.
// - **Id-keyed relations.** Parent, child, and adjacency links are ids into
//   the owning maps rather than references, so cascades are plain loops over
//   explicit stacks and hierarchies of any depth are safe.
// - **Derived exit index.** Exit membership is never edited directly; each
//   mutation re-derives it for the nodes it could affect.

pub mod config;
pub mod engine;
pub mod error;
pub mod exits;
pub mod feed;
pub mod graph;
pub mod load;
pub mod map;
pub mod open_set;
pub mod pathfinding;
pub mod planner;
pub mod registry;
pub mod types;

pub use config::{CategoryNames, ExitPairSelection, MapConfig, OutdoorFilter};
pub use engine::{Lifecycle, MapEngine, StartOutcome};
pub use error::{MapError, ParentLink, Result, SourceError};
pub use feed::{FeedHandle, FeedStats, start_change_feed};
pub use load::{MapSource, load};
pub use map::{MapState, MapStats};
pub use pathfinding::CancelToken;
pub use planner::{Route, RoutePlanner};
pub use types::{ConnectionId, NodeCategory, NodeId, Position, TypeId};
