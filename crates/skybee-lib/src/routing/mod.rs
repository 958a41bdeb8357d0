//! Route queries across the three search strategies.
//!
//! This module provides:
//! - [`RouteAlgorithm`] - Supported strategies (A*, Dijkstra, Q-learning)
//! - [`RouteOutcome`] - Typed answer of a single strategy, including sentinels
//! - [`RouteResult`] - Wire shape `{path, distance}` handed to collaborators
//! - [`RouteEngine`] - Query facade that owns the graph store
//!
//! # Example
//!
//! ```ignore
//! use skybee_lib::{DatasetPaths, GraphStore, RouteAlgorithm, RouteEngine};
//!
//! let paths = DatasetPaths::resolve(None)?;
//! let engine = RouteEngine::new(GraphStore::load_from_paths(&paths));
//! let report = engine.query("LHR", "SYD", &RouteAlgorithm::ALL);
//! ```

mod planner;

pub use planner::{
    select_planner, AStarPlanner, DijkstraPlanner, QLearningPlanner, RoutePlanner,
};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::QLearningConfig;
use crate::graph::{GraphStore, NodeFilter};
use crate::output::{QueryReport, StrategyReport};
use crate::qlearning::CancellationToken;

/// Supported search strategies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum RouteAlgorithm {
    /// A* search guided by great-circle distance.
    #[default]
    #[serde(rename = "a-star")]
    AStar,
    /// Dijkstra's algorithm (uniform cost).
    #[serde(rename = "dijkstra")]
    Dijkstra,
    /// Per-query tabular Q-learning.
    #[serde(rename = "q-learning")]
    QLearning,
}

impl RouteAlgorithm {
    pub const ALL: [RouteAlgorithm; 3] = [
        RouteAlgorithm::AStar,
        RouteAlgorithm::Dijkstra,
        RouteAlgorithm::QLearning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RouteAlgorithm::AStar => "a-star",
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::QLearning => "q-learning",
        }
    }
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "a-star" | "astar" | "a_star" => Ok(RouteAlgorithm::AStar),
            "dijkstra" => Ok(RouteAlgorithm::Dijkstra),
            "q-learning" | "qlearning" | "q_learning" | "rl" => Ok(RouteAlgorithm::QLearning),
            other => Err(format!("unknown algorithm: {other}")),
        }
    }
}

/// Answer of a single strategy.
///
/// Every variant other than `Found` is a sentinel: a recoverable outcome that
/// is reported to the caller instead of raised.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found { path: Vec<String>, distance: f64 },
    /// The tables failed to load at startup.
    NotLoaded,
    UnknownAirport { code: String },
    /// The airports lie in different connected components.
    NoPath { from: String, to: String },
    /// The learned policy led to an airport with no routes.
    DeadEnd { at: String },
    /// The learned policy did not reach the goal within the step cap.
    Incomplete,
    TimedOut,
    Cancelled,
}

impl RouteOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, RouteOutcome::Found { .. })
    }

    /// Flatten into the `{path, distance}` shape, using a one-element path
    /// holding a message for sentinels.
    pub fn to_result(&self) -> RouteResult {
        let sentinel = |message: String| RouteResult {
            path: vec![message],
            distance: 0.0,
        };
        match self {
            RouteOutcome::Found { path, distance } => RouteResult {
                path: path.clone(),
                distance: *distance,
            },
            RouteOutcome::NotLoaded => sentinel("data not loaded".to_string()),
            RouteOutcome::UnknownAirport { code } => sentinel(format!("Unknown airport {code}")),
            RouteOutcome::NoPath { from, to } => {
                sentinel(format!("No path found from {from} to {to}"))
            }
            RouteOutcome::DeadEnd { at } => sentinel(format!("Dead end at {at}")),
            RouteOutcome::Incomplete => sentinel("Path incomplete".to_string()),
            RouteOutcome::TimedOut => sentinel("Search timed out".to_string()),
            RouteOutcome::Cancelled => sentinel("Search cancelled".to_string()),
        }
    }
}

/// Path and distance as consumed by downstream collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub path: Vec<String>,
    /// Total distance in kilometres; zero for sentinels.
    pub distance: f64,
}

impl From<RouteOutcome> for RouteResult {
    fn from(outcome: RouteOutcome) -> Self {
        outcome.to_result()
    }
}

/// Query facade over a graph store built once at startup.
///
/// The engine holds no mutable state, so a shared reference can serve
/// concurrent callers. Q-learning tables are allocated per query.
///
/// The default [`QLearningConfig`] sets no training deadline. Callers serving
/// requests must set `time_budget_ms` through
/// [`RouteEngine::with_q_learning_config`] or cancel through
/// [`RouteEngine::query_with_cancellation`]; otherwise a Q-learning query runs
/// every configured episode on the calling thread.
#[derive(Debug, Clone)]
pub struct RouteEngine {
    store: GraphStore,
    q_learning: QLearningConfig,
}

impl RouteEngine {
    pub fn new(store: GraphStore) -> Self {
        Self {
            store,
            q_learning: QLearningConfig::default(),
        }
    }

    pub fn with_q_learning_config(mut self, config: QLearningConfig) -> Self {
        self.q_learning = config;
        self
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn q_learning_config(&self) -> &QLearningConfig {
        &self.q_learning
    }

    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    /// Sorted airport identifiers for populating a selection list.
    pub fn airports(&self, filter: NodeFilter) -> Vec<&str> {
        self.store.codes(filter)
    }

    /// Run a single strategy.
    pub fn query_one(
        &self,
        source: &str,
        destination: &str,
        algorithm: RouteAlgorithm,
    ) -> RouteOutcome {
        let cancel = CancellationToken::new();
        select_planner(algorithm, &self.q_learning, &cancel).plan(
            &self.store,
            source,
            destination,
        )
    }

    /// Run each requested strategy once and collect the results.
    pub fn query(
        &self,
        source: &str,
        destination: &str,
        algorithms: &[RouteAlgorithm],
    ) -> QueryReport {
        self.query_with_cancellation(source, destination, algorithms, &CancellationToken::new())
    }

    /// Like [`RouteEngine::query`], with a token that aborts Q-learning training.
    pub fn query_with_cancellation(
        &self,
        source: &str,
        destination: &str,
        algorithms: &[RouteAlgorithm],
        cancel: &CancellationToken,
    ) -> QueryReport {
        let mut results = BTreeMap::new();
        for &algorithm in algorithms {
            if results.contains_key(&algorithm) {
                continue;
            }
            let planner = select_planner(algorithm, &self.q_learning, cancel);
            let started = Instant::now();
            let outcome = planner.plan(&self.store, source, destination);
            let elapsed = started.elapsed();

            info!(
                %algorithm,
                source,
                destination,
                found = outcome.is_found(),
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "route query finished"
            );
            results.insert(algorithm, StrategyReport::new(&outcome, elapsed));
        }

        QueryReport {
            source: source.to_string(),
            destination: destination.to_string(),
            results,
        }
    }
}
