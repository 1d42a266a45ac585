// Shared campus fixture for the integration tests.
//
// Two buildings joined by a street:
//
//   B1: R1 --10-- R2 --10-- D1 --5-- S1 --75-- S2 --5-- D2 --10-- R3 :B2
//
// All nodes lie on the x axis at the coordinates their connection lengths
// imply, so the straight-line heuristic is exact along the street.

#![allow(dead_code)]

use wayfinder_map::{MapConfig, MapEngine, NodeId, TypeId};
use wayfinder_records::MapSnapshot;

pub const BUILDING: TypeId = TypeId(1);
pub const ROOM: TypeId = TypeId(2);
pub const DOOR: TypeId = TypeId(3);
pub const STREET: TypeId = TypeId(4);
pub const ELEVATOR: TypeId = TypeId(5);

pub const B1: NodeId = NodeId(1);
pub const B2: NodeId = NodeId(2);
pub const R1: NodeId = NodeId(11);
pub const R2: NodeId = NodeId(12);
pub const D1: NodeId = NodeId(13);
pub const S1: NodeId = NodeId(21);
pub const S2: NodeId = NodeId(22);
pub const D2: NodeId = NodeId(31);
pub const R3: NodeId = NodeId(32);

pub const CAMPUS_JSON: &str = r#"{
    "categories": [
        {"id": 1, "name": "Building"},
        {"id": 2, "name": "Room"},
        {"id": 3, "parent_id": 2, "name": "Door"},
        {"id": 4, "name": "Street"},
        {"id": 5, "name": "Elevator"}
    ],
    "nodes": [
        {"id": 11, "parent_id": 1, "type_id": 2, "name": "R1", "x": 0.0, "y": 0.0, "z": 0.0},
        {"id": 12, "parent_id": 1, "type_id": 2, "name": "R2", "x": 10.0, "y": 0.0, "z": 0.0},
        {"id": 13, "parent_id": 1, "type_id": 3, "name": "D1", "x": 20.0, "y": 0.0, "z": 0.0},
        {"id": 21, "type_id": 4, "name": "S1", "x": 25.0, "y": 0.0, "z": 0.0},
        {"id": 22, "type_id": 4, "name": "S2", "x": 100.0, "y": 0.0, "z": 0.0},
        {"id": 31, "parent_id": 2, "type_id": 3, "name": "D2", "x": 105.0, "y": 0.0, "z": 0.0},
        {"id": 32, "parent_id": 2, "type_id": 2, "name": "R3", "x": 115.0, "y": 0.0, "z": 0.0},
        {"id": 1, "type_id": 1, "name": "B1", "x": 10.0, "y": 0.0, "z": 0.0},
        {"id": 2, "type_id": 1, "name": "B2", "x": 110.0, "y": 0.0, "z": 0.0}
    ],
    "connections": [
        {"id": 1, "node_a": 11, "node_b": 12, "distance": 10.0, "time": 8.0, "weight": 0.0},
        {"id": 2, "node_a": 12, "node_b": 13, "distance": 10.0, "time": 8.0, "weight": 0.0},
        {"id": 3, "node_a": 13, "node_b": 21, "distance": 5.0, "time": 4.0, "weight": 0.0},
        {"id": 4, "node_a": 21, "node_b": 22, "distance": 75.0, "time": 60.0, "weight": 0.0},
        {"id": 5, "node_a": 22, "node_b": 31, "distance": 5.0, "time": 4.0, "weight": 0.0},
        {"id": 6, "node_a": 31, "node_b": 32, "distance": 10.0, "time": 8.0, "weight": 0.0}
    ]
}"#;

pub fn campus_snapshot() -> MapSnapshot {
    MapSnapshot::from_json(CAMPUS_JSON).unwrap()
}

/// Route engine logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An engine that has loaded the campus.
pub fn campus_engine(config: MapConfig) -> MapEngine {
    init_tracing();
    let engine = MapEngine::new(config);
    engine.start(&campus_snapshot()).unwrap();
    engine
}
