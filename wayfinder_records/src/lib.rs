// wayfinder_records — boundary vocabulary for the campus map engine.
//
// This crate defines the rows and notifications exchanged between the
// in-memory engine (`wayfinder_map`) and its collaborators: the persistence
// layer that bulk-loads and mutates the map, and the request layer that
// asks for routes. It has no dependency on the engine.
//
// Module overview:
// - `types.rs`:     Id newtypes — `TypeId`, `NodeId`, `ConnectionId`.
// - `records.rs`:   Bulk-load rows (`CategoryRecord`, `NodeRecord`,
//                   `ConnectionRecord`) and the `RouteStep` answer row.
// - `change.rs`:    `MapChange`, one variant per committed persistent change.
// - `snapshot.rs`:  `MapSnapshot`, a complete bulk load held in memory.
//
// Design decisions:
// - **JSON via serde.** Every type derives `Serialize`/`Deserialize`; the
//   request layer and fixtures speak JSON.
// - **Integer keys.** Ids mirror the persistence layer's primary keys; the
//   engine never invents ids of its own.

pub mod change;
pub mod records;
pub mod snapshot;
pub mod types;

pub use change::MapChange;
pub use records::{CategoryRecord, ConnectionRecord, NodeRecord, RouteStep};
pub use snapshot::MapSnapshot;
pub use types::{ConnectionId, NodeId, TypeId};
