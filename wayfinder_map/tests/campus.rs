// End-to-end routing over the campus fixture.
//
// Loads the two-building campus through `MapEngine::start` and checks the
// route answers for each combination of indoor and outdoor endpoints, then
// the effect of mutations (cascading deletes, exit invalidation) and of
// the legacy search policies on those answers.

mod common;

use common::*;
use wayfinder_map::{
    ConnectionId, ExitPairSelection, MapConfig, MapEngine, MapError, NodeId, OutdoorFilter, Position,
    Route, TypeId,
};

fn ids(route: &Route) -> Vec<NodeId> {
    route.steps.iter().map(|step| step.id).collect()
}

#[test]
fn route_between_buildings_goes_through_both_exits() {
    let engine = campus_engine(MapConfig::default());
    let route = engine.navigate(R1, R3).unwrap();
    assert_eq!(ids(&route), vec![R1, R2, D1, S1, S2, D2, R3]);
    assert_eq!(route.length, 115.0);

    let names: Vec<&str> = route.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["R1", "R2", "D1", "S1", "S2", "D2", "R3"]);
}

#[test]
fn route_answer_serializes_as_id_name_rows() {
    let engine = campus_engine(MapConfig::default());
    let route = engine.navigate(R1, R2).unwrap();
    let json = serde_json::to_value(&route.steps).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{"id": 11, "name": "R1"}, {"id": 12, "name": "R2"}])
    );
}

#[test]
fn route_to_self_is_a_single_step() {
    let engine = campus_engine(MapConfig::default());
    for node in [R2, S1] {
        let route = engine.navigate(node, node).unwrap();
        assert_eq!(ids(&route), vec![node]);
        assert_eq!(route.length, 0.0);
    }
}

#[test]
fn route_within_one_building_stays_indoors() {
    let engine = campus_engine(MapConfig::default());
    let route = engine.navigate(R1, D1).unwrap();
    assert_eq!(ids(&route), vec![R1, R2, D1]);
    assert_eq!(route.length, 20.0);
}

#[test]
fn route_from_the_street_enters_through_an_exit() {
    let engine = campus_engine(MapConfig::default());
    let route = engine.navigate(S2, R1).unwrap();
    assert_eq!(ids(&route), vec![S2, S1, D1, R2, R1]);
    assert_eq!(route.length, 100.0);
}

#[test]
fn route_to_the_street_leaves_through_an_exit() {
    let engine = campus_engine(MapConfig::default());
    let route = engine.navigate(R3, S1).unwrap();
    assert_eq!(ids(&route), vec![R3, D2, S2, S1]);
    assert_eq!(route.length, 90.0);
}

#[test]
fn unknown_endpoints_are_reported() {
    let engine = campus_engine(MapConfig::default());
    assert!(matches!(engine.navigate(R1, NodeId(404)), Err(MapError::UnknownNode(NodeId(404)))));
}

#[test]
fn deleting_a_building_removes_its_rooms() {
    let engine = campus_engine(MapConfig::default());
    engine.delete_node(B1).unwrap();
    assert!(matches!(engine.navigate(R1, R3), Err(MapError::UnknownNode(R1))));
    // The street side is untouched.
    assert_eq!(engine.navigate(S1, R3).unwrap().length, 90.0);
}

#[test]
fn removing_the_only_exit_link_makes_the_building_unreachable() {
    let engine = campus_engine(MapConfig::default());
    engine.delete_connection(ConnectionId(3), D1, S1).unwrap();
    assert!(engine.navigate(R1, R3).unwrap_err().is_no_path());

    // A new street link through R2 restores a route, with R2 as the exit.
    engine.add_connection(ConnectionId(7), R2, S1, 15.0, 12.0, 0.0).unwrap();
    let route = engine.navigate(R1, R3).unwrap();
    assert_eq!(ids(&route), vec![R1, R2, S1, S2, D2, R3]);
    assert_eq!(route.length, 115.0);
}

/// Add a second, farther exit D3 to B2. Its id sorts after D2.
fn add_far_exit(engine: &MapEngine) -> NodeId {
    let d3 = NodeId(33);
    engine
        .add_node(d3, DOOR, Some(B2), Position::new(100.0, 5.0, 0.0), "D3")
        .unwrap();
    engine.add_connection(ConnectionId(8), S2, d3, 20.0, 16.0, 0.0).unwrap();
    engine.add_connection(ConnectionId(9), d3, R3, 16.0, 13.0, 0.0).unwrap();
    d3
}

#[test]
fn full_minimum_compares_every_exit_pair() {
    let engine = campus_engine(MapConfig::default());
    add_far_exit(&engine);
    let route = engine.navigate(R1, R3).unwrap();
    assert_eq!(ids(&route), vec![R1, R2, D1, S1, S2, D2, R3]);
    assert_eq!(route.length, 115.0);
}

#[test]
fn legacy_pair_selection_only_tries_the_last_target_exit() {
    let config = MapConfig {
        exit_pair_selection: ExitPairSelection::LastPairPerStartExit,
        ..MapConfig::default()
    };
    let engine = campus_engine(config);
    let d3 = add_far_exit(&engine);
    let route = engine.navigate(R1, R3).unwrap();
    assert_eq!(ids(&route), vec![R1, R2, D1, S1, S2, d3, R3]);
    assert_eq!(route.length, 136.0);
}

/// A room standing on its own outside any building, offering a shortcut
/// between S1 and D2 once the street itself is made long.
fn add_tunnel(engine: &MapEngine) -> NodeId {
    let tunnel = NodeId(40);
    engine.change_connection(ConnectionId(4), 120.0, 96.0, 0.0).unwrap();
    engine
        .add_node(tunnel, ROOM, None, Position::new(65.0, 0.0, 0.0), "tunnel")
        .unwrap();
    engine.add_connection(ConnectionId(10), S1, tunnel, 40.0, 32.0, 0.0).unwrap();
    engine.add_connection(ConnectionId(11), tunnel, D2, 40.0, 32.0, 0.0).unwrap();
    tunnel
}

#[test]
fn outdoor_search_ignores_rooms_by_default() {
    let engine = campus_engine(MapConfig::default());
    add_tunnel(&engine);
    let route = engine.navigate(R1, R3).unwrap();
    assert_eq!(ids(&route), vec![R1, R2, D1, S1, S2, D2, R3]);
    assert_eq!(route.length, 160.0);
}

#[test]
fn unrestricted_outdoor_search_cuts_through_rooms() {
    let config = MapConfig {
        outdoor_filter: OutdoorFilter::Unrestricted,
        ..MapConfig::default()
    };
    let engine = campus_engine(config);
    let tunnel = add_tunnel(&engine);
    let route = engine.navigate(R1, R3).unwrap();
    assert_eq!(ids(&route), vec![R1, R2, D1, S1, tunnel, D2, R3]);
    assert_eq!(route.length, 115.0);
}

#[test]
fn elevators_are_not_traversed_indoors() {
    let engine = campus_engine(MapConfig::default());
    // Replace the R1-R2 corridor with a lift between them.
    let lift = NodeId(14);
    engine
        .add_node(lift, ELEVATOR, Some(B1), Position::new(5.0, 0.0, 0.0), "lift")
        .unwrap();
    engine.delete_connection(ConnectionId(1), R1, R2).unwrap();
    engine.add_connection(ConnectionId(12), R1, lift, 5.0, 4.0, 0.0).unwrap();
    engine.add_connection(ConnectionId(13), lift, R2, 5.0, 4.0, 0.0).unwrap();

    assert!(engine.navigate(R1, R2).unwrap_err().is_no_path());
    // The lift itself is still a valid destination.
    assert_eq!(engine.navigate(R1, lift).unwrap().length, 5.0);
}

#[test]
fn deleting_a_category_deletes_its_nodes() {
    let engine = campus_engine(MapConfig::default());
    engine.delete_type(DOOR).unwrap();
    assert!(matches!(engine.navigate(D1, R1), Err(MapError::UnknownNode(D1))));
    let stats = engine.stats().unwrap();
    assert_eq!(stats.types, 4);
    assert_eq!(stats.nodes, 7);
    assert_eq!(stats.exits, 0);
}

#[test]
fn readiness_gates_every_entry_point() {
    let engine = MapEngine::new(MapConfig::default());
    assert!(matches!(engine.navigate(R1, R3), Err(MapError::NotReady)));
    assert!(matches!(engine.add_type(TypeId(9), None, "x"), Err(MapError::NotReady)));

    engine.start(&campus_snapshot()).unwrap();
    assert!(engine.navigate(R1, R3).is_ok());

    engine.stop();
    assert!(matches!(engine.navigate(R1, R3), Err(MapError::NotReady)));
    assert!(matches!(
        engine.change_node(R1, ROOM, Position::default()),
        Err(MapError::NotReady)
    ));
}
