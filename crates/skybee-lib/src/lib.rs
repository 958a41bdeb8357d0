//! SkyBee Routes library entry points.
//!
//! This crate loads the airport and route tables, builds an immutable route
//! graph, and answers "best route from A to B, and its length" with three
//! strategies: A*, Dijkstra, and per-query Q-learning. Higher-level consumers
//! (CLI, web front ends) should only depend on the functions exported here
//! instead of reimplementing behavior.

#![deny(warnings)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod geo;
pub mod graph;
pub mod output;
pub mod path;
pub mod qlearning;
pub mod routing;

pub use config::QLearningConfig;
pub use dataset::{load_dataset, Dataset, DatasetPaths};
pub use error::{Error, Result};
pub use geo::{haversine, Coordinates};
pub use graph::{build_graph, Graph, GraphBuilder, GraphStore, NodeFilter, NodeIndex};
pub use output::{QueryReport, StrategyReport};
pub use path::{find_route_a_star, find_route_dijkstra, SearchPath};
pub use qlearning::{find_route_q_learning, CancellationToken, QLearningOutcome};
pub use routing::{
    select_planner, RouteAlgorithm, RouteEngine, RouteOutcome, RoutePlanner, RouteResult,
};
