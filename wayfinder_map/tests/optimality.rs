// Randomized optimality checks.
//
// Builds small random maps from a seeded StdRng, with every connection at
// least as long as the straight line between its ends, and compares A*
// route lengths against Floyd-Warshall distances over the same edges.
// Maps are either all-street (one outdoor search) or all rooms inside a
// single building (one indoor search), so the reference is exact.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use wayfinder_map::{ConnectionId, MapConfig, MapError, MapState, NodeId, Position, TypeId};
use wayfinder_map::pathfinding::SearchControl;

const BUILDING: TypeId = TypeId(1);
const ROOM: TypeId = TypeId(2);
const STREET: TypeId = TypeId(3);
const NODES: usize = 12;

struct RandomMap {
    state: MapState,
    /// Node ids in index order.
    ids: Vec<NodeId>,
    /// All-pairs shortest distances, `f64::INFINITY` if unreachable.
    reference: Vec<Vec<f64>>,
}

fn random_map(seed: u64, indoor: bool) -> RandomMap {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = MapState::new(MapConfig::default());
    state.add_type(BUILDING, None, "Building").unwrap();
    state.add_type(ROOM, None, "Room").unwrap();
    state.add_type(STREET, None, "Street").unwrap();

    let (parent, kind) = if indoor {
        let building = NodeId(1000);
        state
            .add_node(building, BUILDING, None, Position::default(), "hall")
            .unwrap();
        (Some(building), ROOM)
    } else {
        (None, STREET)
    };

    let positions: Vec<Position> = (0..NODES)
        .map(|_| Position::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..10.0)))
        .collect();
    let ids: Vec<NodeId> = (0..NODES).map(|i| NodeId(i as u64 + 1)).collect();
    for (i, (&id, &pos)) in ids.iter().zip(&positions).enumerate() {
        state.add_node(id, kind, parent, pos, &format!("n{i}")).unwrap();
    }

    let mut reference = vec![vec![f64::INFINITY; NODES]; NODES];
    for (i, row) in reference.iter_mut().enumerate() {
        row[i] = 0.0;
    }
    let mut next_conn = 1;
    for i in 0..NODES {
        for j in (i + 1)..NODES {
            if !rng.gen_bool(0.3) {
                continue;
            }
            let distance = positions[i].distance_to(positions[j]) * rng.gen_range(1.0..1.5);
            state
                .add_connection(ConnectionId(next_conn), ids[i], ids[j], distance, distance, 0.0)
                .unwrap();
            next_conn += 1;
            reference[i][j] = distance;
            reference[j][i] = distance;
        }
    }

    for k in 0..NODES {
        for i in 0..NODES {
            for j in 0..NODES {
                let through = reference[i][k] + reference[k][j];
                if through < reference[i][j] {
                    reference[i][j] = through;
                }
            }
        }
    }

    RandomMap { state, ids, reference }
}

fn check_all_pairs(map: &RandomMap) {
    let control = SearchControl::unbounded();
    for i in 0..NODES {
        for j in 0..NODES {
            let expected = map.reference[i][j];
            match map.state.navigate(map.ids[i], map.ids[j], &control) {
                Ok(route) => {
                    assert_relative_eq!(route.length, expected, max_relative = 1e-9);
                    assert_eq!(route.nodes.first(), Some(&map.ids[i]));
                    assert_eq!(route.nodes.last(), Some(&map.ids[j]));
                    // The reported length is the sum of the hops.
                    let hops: f64 = route
                        .nodes
                        .windows(2)
                        .map(|pair| {
                            let node = map.state.graph().node(pair[0]).unwrap();
                            let conn = node.adjacency[&pair[1]];
                            map.state.graph().connection(conn).unwrap().distance
                        })
                        .sum();
                    assert_relative_eq!(hops, route.length, max_relative = 1e-9);
                }
                Err(MapError::NoPathFound { .. }) => assert!(expected.is_infinite()),
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }
}

#[test]
fn outdoor_routes_are_shortest() {
    for seed in 0..20 {
        check_all_pairs(&random_map(seed, false));
    }
}

#[test]
fn indoor_routes_are_shortest() {
    for seed in 100..120 {
        check_all_pairs(&random_map(seed, true));
    }
}
