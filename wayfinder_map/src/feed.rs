// Change-notification worker.
//
// Committed changes to the persistent map arrive as `MapChange` messages on
// an mpsc channel. `start_change_feed` spawns a thread that applies them to
// a shared `MapEngine` one at a time, in arrival order. Each change takes
// the engine's write lock only for its own duration, so queries interleave
// between changes but never observe a half-applied one.
//
// A rejected change (unknown id, engine not ready, ...) is logged and
// counted; the worker keeps going. The loop uses `recv_timeout` so it can
// notice `keep_running` going false even while the channel is idle.
//
// Shutdown: `FeedHandle::stop` clears `keep_running` and joins the thread.
// Changes already queued are applied before the thread exits.
// `FeedHandle::join` instead waits for every sender to be dropped. Dropping
// the handle behaves like `stop`, so the worker never outlives it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use wayfinder_records::MapChange;

use crate::engine::MapEngine;

/// How often an idle worker re-checks `keep_running`.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Counts reported by a finished (or running) feed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub applied: u64,
    pub rejected: u64,
}

#[derive(Default)]
struct Counters {
    applied: AtomicU64,
    rejected: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> FeedStats {
        FeedStats {
            applied: self.applied.load(Ordering::SeqCst),
            rejected: self.rejected.load(Ordering::SeqCst),
        }
    }
}

/// Handle to a running change feed.
pub struct FeedHandle {
    keep_running: Arc<AtomicBool>,
    counters: Arc<Counters>,
    thread: Option<thread::JoinHandle<()>>,
}

impl FeedHandle {
    pub fn stats(&self) -> FeedStats {
        self.counters.snapshot()
    }

    /// Changes applied so far.
    pub fn applied(&self) -> u64 {
        self.counters.applied.load(Ordering::SeqCst)
    }

    /// Changes the engine refused so far.
    pub fn rejected(&self) -> u64 {
        self.counters.rejected.load(Ordering::SeqCst)
    }

    /// Stop the worker after it drains the changes already queued.
    pub fn stop(mut self) -> FeedStats {
        self.keep_running.store(false, Ordering::SeqCst);
        self.wait()
    }

    /// Wait for the worker to exit on its own, which happens once every
    /// `Sender` has been dropped.
    pub fn join(mut self) -> FeedStats {
        self.wait()
    }

    fn wait(&mut self) -> FeedStats {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        self.counters.snapshot()
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        self.wait();
    }
}

/// Spawn the worker. Send changes through the returned `Sender`.
pub fn start_change_feed(engine: Arc<MapEngine>) -> (Sender<MapChange>, FeedHandle) {
    let (tx, rx) = mpsc::channel();
    let keep_running = Arc::new(AtomicBool::new(true));
    let counters = Arc::new(Counters::default());

    let worker_keep_running = keep_running.clone();
    let worker_counters = counters.clone();
    let thread = thread::spawn(move || {
        run_feed(&engine, &rx, &worker_keep_running, &worker_counters);
    });

    (
        tx,
        FeedHandle {
            keep_running,
            counters,
            thread: Some(thread),
        },
    )
}

fn run_feed(engine: &MapEngine, rx: &Receiver<MapChange>, keep_running: &AtomicBool, counters: &Counters) {
    tracing::debug!("change feed started");
    while keep_running.load(Ordering::SeqCst) {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(change) => apply_one(engine, &change, counters),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    // Drain whatever was already queued.
    while let Ok(change) = rx.try_recv() {
        apply_one(engine, &change, counters);
    }
    let stats = counters.snapshot();
    tracing::debug!(applied = stats.applied, rejected = stats.rejected, "change feed stopped");
}

fn apply_one(engine: &MapEngine, change: &MapChange, counters: &Counters) {
    match engine.apply(change) {
        Ok(()) => {
            counters.applied.fetch_add(1, Ordering::SeqCst);
        }
        Err(err) => {
            counters.rejected.fetch_add(1, Ordering::SeqCst);
            tracing::warn!(kind = change.kind(), error = %err, "map change rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::types::{NodeId, TypeId};
    use wayfinder_records::{CategoryRecord, MapSnapshot};

    fn ready_engine() -> Arc<MapEngine> {
        let engine = Arc::new(MapEngine::new(MapConfig::default()));
        engine.start(&MapSnapshot::new()).unwrap();
        engine
    }

    fn category(id: u64, name: &str) -> MapChange {
        MapChange::CategoryCreated(CategoryRecord {
            id: TypeId(id),
            parent_id: None,
            name: name.into(),
            shortname: None,
            description: None,
        })
    }

    #[test]
    fn applies_changes_in_order_until_senders_drop() {
        let engine = ready_engine();
        let (tx, handle) = start_change_feed(engine.clone());
        tx.send(category(1, "Room")).unwrap();
        tx.send(MapChange::CategoryRenamed {
            id: TypeId(1),
            name: "Lecture hall".into(),
        })
        .unwrap();
        drop(tx);

        let stats = handle.join();
        assert_eq!(stats, FeedStats { applied: 2, rejected: 0 });
        let name = engine
            .read(|map| map.registry().get(TypeId(1)).map(|t| t.name.clone()))
            .unwrap();
        assert_eq!(name.as_deref(), Some("Lecture hall"));
    }

    #[test]
    fn rejected_changes_are_counted_and_skipped() {
        let engine = ready_engine();
        let (tx, handle) = start_change_feed(engine.clone());
        tx.send(MapChange::NodeDeleted { id: NodeId(42) }).unwrap();
        tx.send(category(1, "Room")).unwrap();
        tx.send(category(1, "Room")).unwrap();

        let stats = handle.stop();
        assert_eq!(stats, FeedStats { applied: 1, rejected: 2 });
        assert_eq!(engine.stats().unwrap().types, 1);
    }

    #[test]
    fn changes_are_rejected_while_stopped() {
        let engine = Arc::new(MapEngine::new(MapConfig::default()));
        let (tx, handle) = start_change_feed(engine);
        tx.send(category(1, "Room")).unwrap();
        drop(tx);
        while handle.rejected() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(handle.applied(), 0);
        assert_eq!(handle.join(), FeedStats { applied: 0, rejected: 1 });
    }

    #[test]
    fn dropping_the_handle_stops_the_worker() {
        let engine = ready_engine();
        let (tx, handle) = start_change_feed(engine.clone());
        tx.send(category(1, "Room")).unwrap();
        drop(handle);

        // The worker drained the queue and exited, taking the receiver.
        assert_eq!(engine.stats().unwrap().types, 1);
        assert!(tx.send(category(2, "Hall")).is_err());
    }
}
