// Thread-safe map engine.
//
// `MapEngine` is the facade callers hold (usually behind an `Arc`). It wraps
// one `MapState` in a `parking_lot::RwLock`: route queries take the read
// lock and run in parallel; mutations take the write lock, so each one is
// applied atomically with respect to every query.
//
// Lifecycle: Stopped -> Loading -> Ready -> Stopped. `start` and `stop` are
// serialized by a transition mutex. `start` is idempotent once Ready, and a
// second `start` while a load is in flight fails with `LoadInProgress`
// instead of queueing. The load builds its `MapState` without holding the
// state lock, so queries keep failing fast with `NotReady` rather than
// blocking behind a slow source. Readiness is always re-checked under the
// state lock, so a query can never observe a half-cleared map.
//
// `stop` raises a halt flag before taking the write lock; searches in flight
// see it at their next open-set pop and return `Cancelled`, which lets the
// write lock through promptly.
//
// See also: `map.rs` for the single-threaded core, `feed.rs` for the
// change-notification worker that drives mutations from a channel.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use wayfinder_records::MapChange;

use crate::config::MapConfig;
use crate::error::{MapError, Result};
use crate::load::{MapSource, load};
use crate::map::{MapState, MapStats};
use crate::pathfinding::{CancelToken, SearchControl};
use crate::planner::Route;
use crate::types::{ConnectionId, NodeId, Position, TypeId};

/// Where the engine is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Lifecycle {
    Stopped,
    Loading,
    Ready,
}

impl Lifecycle {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Lifecycle::Loading,
            2 => Lifecycle::Ready,
            _ => Lifecycle::Stopped,
        }
    }
}

/// Result of a successful `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// A fresh map was loaded.
    Started(MapStats),
    /// The engine was already Ready; nothing was reloaded.
    AlreadyRunning,
}

pub struct MapEngine {
    config: MapConfig,
    lifecycle: AtomicU8,
    halt: AtomicBool,
    transition: Mutex<()>,
    state: RwLock<MapState>,
}

impl MapEngine {
    pub fn new(config: MapConfig) -> Self {
        let state = MapState::new(config.clone());
        Self {
            config,
            lifecycle: AtomicU8::new(Lifecycle::Stopped as u8),
            halt: AtomicBool::new(false),
            transition: Mutex::new(()),
            state: RwLock::new(state),
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.lifecycle.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle() == Lifecycle::Ready
    }

    fn set_lifecycle(&self, lifecycle: Lifecycle) {
        self.lifecycle.store(lifecycle as u8, Ordering::Release);
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(MapError::NotReady)
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Load the map from `source` and become Ready.
    pub fn start(&self, source: &dyn MapSource) -> Result<StartOutcome> {
        let Some(_transition) = self.transition.try_lock() else {
            return Err(MapError::LoadInProgress);
        };
        if self.is_ready() {
            tracing::debug!("start requested while ready; ignoring");
            return Ok(StartOutcome::AlreadyRunning);
        }

        self.set_lifecycle(Lifecycle::Loading);
        tracing::info!("loading map");
        let started = Instant::now();

        match load(source, self.config.clone()) {
            Ok(loaded) => {
                let stats = loaded.stats();
                let mut state = self.state.write();
                *state = loaded;
                self.set_lifecycle(Lifecycle::Ready);
                tracing::info!(
                    types = stats.types,
                    nodes = stats.nodes,
                    connections = stats.connections,
                    exits = stats.exits,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "map ready"
                );
                Ok(StartOutcome::Started(stats))
            }
            Err(err) => {
                self.set_lifecycle(Lifecycle::Stopped);
                tracing::error!(error = %err, "map load failed");
                Err(err)
            }
        }
    }

    /// Discard the map and return to Stopped. Searches in flight are
    /// cancelled. Stopping a stopped engine does nothing.
    pub fn stop(&self) {
        let _transition = self.transition.lock();
        if self.lifecycle() == Lifecycle::Stopped {
            return;
        }
        self.halt.store(true, Ordering::Relaxed);
        {
            let mut state = self.state.write();
            self.set_lifecycle(Lifecycle::Stopped);
            state.clear();
        }
        self.halt.store(false, Ordering::Relaxed);
        tracing::info!("map stopped");
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Shortest route from `start` to `target`, bounded by the configured
    /// search timeout.
    pub fn navigate(&self, start: NodeId, target: NodeId) -> Result<Route> {
        self.navigate_inner(start, target, None)
    }

    /// Like `navigate`, but also aborts when `cancel` is triggered.
    pub fn navigate_with(&self, start: NodeId, target: NodeId, cancel: &CancelToken) -> Result<Route> {
        self.navigate_inner(start, target, Some(cancel))
    }

    fn navigate_inner(&self, start: NodeId, target: NodeId, cancel: Option<&CancelToken>) -> Result<Route> {
        let state = self.state.read();
        self.ensure_ready()?;

        let deadline = self
            .config
            .search_timeout_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        let control = SearchControl::new(cancel, deadline).with_halt(&self.halt);
        let result = state.navigate(start, target, &control);
        match &result {
            Ok(route) => {
                tracing::debug!(%start, %target, hops = route.nodes.len(), length = route.length, "route found")
            }
            Err(err) if err.is_aborted() => tracing::warn!(%start, %target, error = %err, "route search aborted"),
            Err(err) => tracing::debug!(%start, %target, error = %err, "no route"),
        }
        result
    }

    /// Run `f` against the loaded map under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&MapState) -> R) -> Result<R> {
        let state = self.state.read();
        self.ensure_ready()?;
        Ok(f(&state))
    }

    pub fn stats(&self) -> Result<MapStats> {
        self.read(MapState::stats)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    fn mutate<R>(&self, f: impl FnOnce(&mut MapState) -> Result<R>) -> Result<R> {
        let mut state = self.state.write();
        self.ensure_ready()?;
        f(&mut state)
    }

    pub fn add_type(&self, id: TypeId, parent: Option<TypeId>, name: &str) -> Result<()> {
        self.mutate(|state| state.add_type(id, parent, name))
    }

    pub fn change_type(&self, id: TypeId, name: &str) -> Result<()> {
        self.mutate(|state| state.change_type(id, name))
    }

    pub fn delete_type(&self, id: TypeId) -> Result<()> {
        self.mutate(|state| state.delete_type(id))
    }

    pub fn add_node(
        &self,
        id: NodeId,
        type_id: TypeId,
        parent: Option<NodeId>,
        position: Position,
        name: &str,
    ) -> Result<()> {
        self.mutate(|state| state.add_node(id, type_id, parent, position, name))
    }

    pub fn change_node(&self, id: NodeId, type_id: TypeId, position: Position) -> Result<()> {
        self.mutate(|state| state.change_node(id, type_id, position))
    }

    pub fn delete_node(&self, id: NodeId) -> Result<()> {
        self.mutate(|state| state.delete_node(id))
    }

    pub fn add_connection(
        &self,
        id: ConnectionId,
        a: NodeId,
        b: NodeId,
        distance: f64,
        time: f64,
        weight: f64,
    ) -> Result<()> {
        self.mutate(|state| state.add_connection(id, a, b, distance, time, weight))
    }

    pub fn change_connection(&self, id: ConnectionId, distance: f64, time: f64, weight: f64) -> Result<()> {
        self.mutate(|state| state.change_connection(id, distance, time, weight))
    }

    pub fn delete_connection(&self, id: ConnectionId, a: NodeId, b: NodeId) -> Result<()> {
        self.mutate(|state| state.delete_connection(id, a, b))
    }

    /// Apply one committed persistent change.
    pub fn apply(&self, change: &MapChange) -> Result<()> {
        self.mutate(|state| state.apply(change))
    }
}
