#![allow(dead_code)]

use std::path::PathBuf;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skybee_lib::{DatasetPaths, Graph, GraphBuilder, GraphStore, NodeIndex};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture_paths() -> DatasetPaths {
    DatasetPaths::in_dir(&fixtures_dir())
}

pub fn fixture_store() -> GraphStore {
    GraphStore::load_from_paths(&fixture_paths())
}

pub fn fixture_graph() -> Graph {
    fixture_store()
        .graph()
        .cloned()
        .expect("fixture tables load")
}

/// Small connected-or-not graph with haversine weights, reproducible from `seed`.
pub fn random_graph(seed: u64, nodes: usize, edge_probability: f64) -> Graph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut builder = GraphBuilder::new();
    let codes: Vec<String> = (0..nodes).map(|i| format!("N{i:02}")).collect();
    for code in &codes {
        let lat = rng.random_range(-10.0..10.0);
        let lon = rng.random_range(-10.0..10.0);
        builder = builder.airport(code.clone(), lat, lon);
    }
    for a in 0..nodes {
        for b in (a + 1)..nodes {
            if rng.random::<f64>() < edge_probability {
                builder = builder.route(codes[a].clone(), codes[b].clone());
            }
        }
    }
    builder.build()
}

/// Brute-force shortest distance over all simple paths, with the number of
/// paths that achieve it. `None` when `goal` is unreachable.
pub fn exhaustive_shortest(graph: &Graph, start: NodeIndex, goal: NodeIndex) -> Option<(f64, usize)> {
    fn walk(
        graph: &Graph,
        node: NodeIndex,
        goal: NodeIndex,
        distance: f64,
        visited: &mut Vec<bool>,
        found: &mut Vec<f64>,
    ) {
        if node == goal {
            found.push(distance);
            return;
        }
        for edge in graph.neighbours(node) {
            if visited[edge.target] {
                continue;
            }
            visited[edge.target] = true;
            walk(graph, edge.target, goal, distance + edge.distance, visited, found);
            visited[edge.target] = false;
        }
    }

    let mut visited = vec![false; graph.node_count()];
    let mut found = Vec::new();
    visited[start] = true;
    walk(graph, start, goal, 0.0, &mut visited, &mut found);

    let best = found.iter().copied().fold(f64::INFINITY, f64::min);
    if !best.is_finite() {
        return None;
    }
    let ties = found.iter().filter(|d| (**d - best).abs() < 1e-6).count();
    Some((best, ties))
}

/// Whether consecutive entries of `path` are joined by edges of `graph`.
pub fn is_valid_path(graph: &Graph, path: &[String]) -> bool {
    path.windows(2).all(|pair| {
        match (graph.index_of(&pair[0]), graph.index_of(&pair[1])) {
            (Some(a), Some(b)) => graph.edge_distance(a, b).is_some(),
            _ => false,
        }
    })
}
