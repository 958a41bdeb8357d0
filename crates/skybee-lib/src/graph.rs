use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::dataset::{load_dataset, AirportRecord, Dataset, DatasetPaths, RouteRecord};
use crate::error::Result;
use crate::geo::Coordinates;

/// Dense index of an airport inside a [`Graph`].
///
/// Airports are numbered in identifier order, so comparing two indices gives
/// the same answer as comparing the identifiers they stand for.
pub type NodeIndex = usize;

/// Which identifiers [`Graph::codes`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeFilter {
    /// Every loaded airport.
    #[default]
    All,
    /// Only airports whose identifier is exactly three characters (IATA style).
    ThreeLetterCodes,
}

impl NodeFilter {
    fn accepts(self, code: &str) -> bool {
        match self {
            NodeFilter::All => true,
            NodeFilter::ThreeLetterCodes => code.chars().count() == 3,
        }
    }
}

/// Airport node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub code: String,
    pub coordinates: Coordinates,
}

/// Undirected edge as seen from one endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeIndex,
    /// Route length in kilometres.
    pub distance: f64,
}

/// Immutable weighted route network.
///
/// Cloning is cheap; all clones share the same storage.
#[derive(Debug, Clone)]
pub struct Graph {
    airports: Arc<[Airport]>,
    index: Arc<HashMap<String, NodeIndex>>,
    adjacency: Arc<[Vec<Edge>]>,
}

impl Graph {
    /// Number of airports.
    pub fn node_count(&self) -> usize {
        self.airports.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Resolve an airport identifier to its node index.
    pub fn index_of(&self, code: &str) -> Option<NodeIndex> {
        self.index.get(code).copied()
    }

    pub fn airport(&self, node: NodeIndex) -> &Airport {
        &self.airports[node]
    }

    pub fn airport_by_code(&self, code: &str) -> Option<&Airport> {
        self.index_of(code).map(|node| self.airport(node))
    }

    pub fn code(&self, node: NodeIndex) -> &str {
        &self.airports[node].code
    }

    pub fn coordinates(&self, node: NodeIndex) -> Coordinates {
        self.airports[node].coordinates
    }

    /// Edges leaving `node`, ordered by target index.
    pub fn neighbours(&self, node: NodeIndex) -> &[Edge] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Identifiers adjacent to `code`, or `None` when the airport is unknown.
    pub fn neighbour_codes(&self, code: &str) -> Option<Vec<&str>> {
        let node = self.index_of(code)?;
        Some(
            self.neighbours(node)
                .iter()
                .map(|edge| self.code(edge.target))
                .collect(),
        )
    }

    /// Weight of the edge between `from` and `to`, if they are adjacent.
    pub fn edge_distance(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        self.neighbours(from)
            .binary_search_by(|edge| edge.target.cmp(&to))
            .ok()
            .map(|position| self.neighbours(from)[position].distance)
    }

    /// Great-circle distance between two nodes.
    pub fn straight_line_distance(&self, from: NodeIndex, to: NodeIndex) -> f64 {
        self.coordinates(from).distance_to(&self.coordinates(to))
    }

    /// Sorted airport identifiers passing `filter`.
    pub fn codes(&self, filter: NodeFilter) -> Vec<&str> {
        self.airports
            .iter()
            .map(|airport| airport.code.as_str())
            .filter(|code| filter.accepts(code))
            .collect()
    }
}

/// Incremental constructor for [`Graph`].
///
/// Routes may reference airports added later; endpoints are only resolved in
/// [`GraphBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    airports: BTreeMap<String, Coordinates>,
    routes: Vec<(String, String, Option<f64>)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an airport. A repeated identifier replaces the earlier coordinates.
    pub fn airport(mut self, code: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        self.add_airport(code, Coordinates::new(latitude, longitude));
        self
    }

    /// Airports with non-finite or out-of-range coordinates are skipped, and
    /// so are the routes that reference them.
    pub fn add_airport(&mut self, code: impl Into<String>, coordinates: Coordinates) {
        let code = code.into();
        if !coordinates.is_valid() {
            warn!(
                %code,
                latitude = coordinates.latitude,
                longitude = coordinates.longitude,
                "skipping airport with invalid coordinates"
            );
            return;
        }
        self.airports.insert(code, coordinates);
    }

    /// Add a route weighted by the great-circle distance between its endpoints.
    pub fn route(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.add_route(from, to, None);
        self
    }

    /// Add a route with an explicit weight in kilometres.
    pub fn route_with_distance(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        distance: f64,
    ) -> Self {
        self.add_route(from, to, Some(distance));
        self
    }

    pub fn add_route(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        distance: Option<f64>,
    ) {
        self.routes.push((from.into(), to.into(), distance));
    }

    /// Resolve routes against the airport set and freeze the graph.
    ///
    /// Routes with an unknown endpoint, identical endpoints, or a weight that
    /// is negative or not finite are dropped. Repeated routes keep the first
    /// weight seen.
    pub fn build(self) -> Graph {
        let airports: Vec<Airport> = self
            .airports
            .into_iter()
            .map(|(code, coordinates)| Airport { code, coordinates })
            .collect();
        let index: HashMap<String, NodeIndex> = airports
            .iter()
            .enumerate()
            .map(|(node, airport)| (airport.code.clone(), node))
            .collect();

        let mut weights: BTreeMap<(NodeIndex, NodeIndex), f64> = BTreeMap::new();
        let mut dropped = 0usize;

        for (from, to, explicit) in self.routes {
            let (Some(&a), Some(&b)) = (index.get(&from), index.get(&to)) else {
                debug!(%from, %to, "dropping route with unknown endpoint");
                dropped += 1;
                continue;
            };
            if a == b {
                debug!(%from, "dropping self-loop route");
                dropped += 1;
                continue;
            }

            let distance = explicit.unwrap_or_else(|| {
                airports[a]
                    .coordinates
                    .distance_to(&airports[b].coordinates)
            });
            if !distance.is_finite() || distance < 0.0 {
                debug!(%from, %to, distance, "dropping route with invalid weight");
                dropped += 1;
                continue;
            }

            weights.entry((a.min(b), a.max(b))).or_insert(distance);
        }

        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); airports.len()];
        for (&(a, b), &distance) in &weights {
            adjacency[a].push(Edge {
                target: b,
                distance,
            });
            adjacency[b].push(Edge {
                target: a,
                distance,
            });
        }
        for edges in &mut adjacency {
            edges.sort_by_key(|edge| edge.target);
        }

        info!(
            nodes = airports.len(),
            edges = weights.len(),
            dropped_routes = dropped,
            "built route graph"
        );

        Graph {
            airports: airports.into(),
            index: Arc::new(index),
            adjacency: adjacency.into(),
        }
    }
}

/// Build a graph from parsed airport and route rows.
pub fn build_graph(airports: &[AirportRecord], routes: &[RouteRecord]) -> Graph {
    let mut builder = GraphBuilder::new();
    for airport in airports {
        builder.add_airport(airport.code.clone(), airport.coordinates);
    }
    for route in routes {
        builder.add_route(route.departure.clone(), route.destination.clone(), None);
    }
    builder.build()
}

/// Load state of the route network.
///
/// The store is decided once at startup. An `Unloaded` store stays unloaded
/// and every query against it answers with the "data not loaded" sentinel.
#[derive(Debug, Clone)]
pub enum GraphStore {
    Unloaded { reason: String },
    Loaded(Graph),
}

impl GraphStore {
    /// Wrap parsed rows into a loaded store.
    pub fn load(airports: &[AirportRecord], routes: &[RouteRecord]) -> Self {
        GraphStore::Loaded(build_graph(airports, routes))
    }

    /// Build the store from the outcome of reading the tables.
    pub fn from_dataset(dataset: Result<Dataset>) -> Self {
        match dataset {
            Ok(dataset) => Self::load(&dataset.airports, &dataset.routes),
            Err(err) => {
                error!(
                    error = %err,
                    "failed to load airport data; queries will report data not loaded"
                );
                GraphStore::Unloaded {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Read both tables from disk. Never fails; see [`GraphStore::from_dataset`].
    pub fn load_from_paths(paths: &DatasetPaths) -> Self {
        Self::from_dataset(load_dataset(paths))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, GraphStore::Loaded(_))
    }

    pub fn graph(&self) -> Option<&Graph> {
        match self {
            GraphStore::Loaded(graph) => Some(graph),
            GraphStore::Unloaded { .. } => None,
        }
    }

    /// Known airport identifiers, empty when unloaded.
    pub fn codes(&self, filter: NodeFilter) -> Vec<&str> {
        self.graph()
            .map(|graph| graph.codes(filter))
            .unwrap_or_default()
    }

    /// Identifiers adjacent to `code`, empty when unknown or unloaded.
    pub fn neighbours(&self, code: &str) -> Vec<&str> {
        self.graph()
            .and_then(|graph| graph.neighbour_codes(code))
            .unwrap_or_default()
    }
}

impl From<Graph> for GraphStore {
    fn from(graph: Graph) -> Self {
        GraphStore::Loaded(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        GraphBuilder::new()
            .airport("CCC", 0.0, 2.0)
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 0.0, 1.0)
            .route("AAA", "BBB")
            .route("BBB", "CCC")
            .route("CCC", "BBB")
            .build()
    }

    #[test]
    fn airports_with_invalid_coordinates_are_skipped() {
        let graph = GraphBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("NAN", f64::NAN, 0.0)
            .airport("FAR", 0.0, 200.0)
            .route_with_distance("AAA", "NAN", 10.0)
            .route_with_distance("AAA", "FAR", 10.0)
            .build();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.index_of("NAN"), None);
        assert_eq!(graph.index_of("FAR"), None);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn nodes_are_indexed_in_identifier_order() {
        let graph = triangle();
        assert_eq!(graph.index_of("AAA"), Some(0));
        assert_eq!(graph.index_of("BBB"), Some(1));
        assert_eq!(graph.index_of("CCC"), Some(2));
        assert_eq!(graph.codes(NodeFilter::All), vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn repeated_routes_collapse_to_one_edge() {
        let graph = triangle();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.neighbour_codes("BBB"), Some(vec!["AAA", "CCC"]));
    }

    #[test]
    fn edges_are_symmetric() {
        let graph = triangle();
        let a = graph.index_of("AAA").unwrap();
        let b = graph.index_of("BBB").unwrap();
        assert_eq!(graph.edge_distance(a, b), graph.edge_distance(b, a));
        assert_eq!(graph.edge_distance(a, graph.index_of("CCC").unwrap()), None);
    }

    #[test]
    fn invalid_routes_are_dropped() {
        let graph = GraphBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 0.0, 1.0)
            .route("AAA", "ZZZ")
            .route("AAA", "AAA")
            .route_with_distance("AAA", "BBB", -1.0)
            .route_with_distance("AAA", "BBB", f64::NAN)
            .build();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn three_letter_filter_hides_longer_codes() {
        let graph = GraphBuilder::new()
            .airport("EGLL", 51.47, -0.45)
            .airport("LHR", 51.47, -0.45)
            .airport("X1", 0.0, 0.0)
            .build();
        assert_eq!(graph.codes(NodeFilter::ThreeLetterCodes), vec!["LHR"]);
        assert_eq!(graph.codes(NodeFilter::All).len(), 3);
    }

    #[test]
    fn unloaded_store_exposes_nothing() {
        let store = GraphStore::Unloaded {
            reason: "missing file".to_string(),
        };
        assert!(!store.is_loaded());
        assert!(store.codes(NodeFilter::All).is_empty());
        assert!(store.neighbours("AAA").is_empty());
    }
}
