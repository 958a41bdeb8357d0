//! Route planning strategies.
//!
//! Each algorithm is wrapped in a [`RoutePlanner`]. The trait's
//! [`RoutePlanner::plan`] entry point validates the store and endpoints
//! before any search runs, so every strategy answers an unloaded store or an
//! unknown airport with the same sentinel.

use crate::config::QLearningConfig;
use crate::graph::{Graph, GraphStore, NodeIndex};
use crate::path::{find_route_a_star, find_route_dijkstra, SearchPath};
use crate::qlearning::{
    find_route_q_learning, CancellationToken, Extraction, QLearningOutcome, TrainingInterrupt,
};

use super::{RouteAlgorithm, RouteOutcome};

/// Trait for route planning strategies.
pub trait RoutePlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn algorithm(&self) -> RouteAlgorithm;

    /// Search `graph` between two known nodes. `start != goal` is guaranteed.
    fn find_path(&self, graph: &Graph, start: NodeIndex, goal: NodeIndex) -> RouteOutcome;

    /// Resolve identifiers against `store` and run the search.
    fn plan(&self, store: &GraphStore, start: &str, goal: &str) -> RouteOutcome {
        let Some(graph) = store.graph() else {
            return RouteOutcome::NotLoaded;
        };
        let Some(start_node) = graph.index_of(start) else {
            return RouteOutcome::UnknownAirport {
                code: start.to_string(),
            };
        };
        let Some(goal_node) = graph.index_of(goal) else {
            return RouteOutcome::UnknownAirport {
                code: goal.to_string(),
            };
        };
        if start_node == goal_node {
            return RouteOutcome::Found {
                path: vec![start.to_string()],
                distance: 0.0,
            };
        }
        self.find_path(graph, start_node, goal_node)
    }
}

fn found(graph: &Graph, path: SearchPath) -> RouteOutcome {
    RouteOutcome::Found {
        path: path
            .nodes
            .iter()
            .map(|&node| graph.code(node).to_string())
            .collect(),
        distance: path.distance,
    }
}

fn no_path(graph: &Graph, start: NodeIndex, goal: NodeIndex) -> RouteOutcome {
    RouteOutcome::NoPath {
        from: graph.code(start).to_string(),
        to: graph.code(goal).to_string(),
    }
}

/// Uniform-cost baseline.
#[derive(Debug, Clone, Default)]
pub struct DijkstraPlanner;

impl RoutePlanner for DijkstraPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dijkstra
    }

    fn find_path(&self, graph: &Graph, start: NodeIndex, goal: NodeIndex) -> RouteOutcome {
        match find_route_dijkstra(graph, start, goal) {
            Some(path) => found(graph, path),
            None => no_path(graph, start, goal),
        }
    }
}

/// Great-circle guided best-first search.
#[derive(Debug, Clone, Default)]
pub struct AStarPlanner;

impl RoutePlanner for AStarPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::AStar
    }

    fn find_path(&self, graph: &Graph, start: NodeIndex, goal: NodeIndex) -> RouteOutcome {
        match find_route_a_star(graph, start, goal) {
            Some(path) => found(graph, path),
            None => no_path(graph, start, goal),
        }
    }
}

/// Per-query reinforcement learning planner.
///
/// Training is CPU-bound and runs on the calling thread; bound it with
/// `time_budget_ms` or the cancellation token when serving concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct QLearningPlanner {
    config: QLearningConfig,
    cancel: CancellationToken,
}

impl QLearningPlanner {
    pub fn new(config: QLearningConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a token that aborts training when cancelled.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }
}

impl RoutePlanner for QLearningPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::QLearning
    }

    fn find_path(&self, graph: &Graph, start: NodeIndex, goal: NodeIndex) -> RouteOutcome {
        match find_route_q_learning(graph, start, goal, &self.config, &self.cancel) {
            QLearningOutcome::Extracted(Extraction::Success(path)) => found(graph, path),
            QLearningOutcome::Extracted(Extraction::DeadEnd(node)) => RouteOutcome::DeadEnd {
                at: graph.code(node).to_string(),
            },
            QLearningOutcome::Extracted(Extraction::Incomplete) => RouteOutcome::Incomplete,
            QLearningOutcome::Interrupted(TrainingInterrupt::TimedOut) => RouteOutcome::TimedOut,
            QLearningOutcome::Interrupted(TrainingInterrupt::Cancelled) => RouteOutcome::Cancelled,
        }
    }
}

/// Build the planner for `algorithm`.
pub fn select_planner(
    algorithm: RouteAlgorithm,
    q_learning: &QLearningConfig,
    cancel: &CancellationToken,
) -> Box<dyn RoutePlanner> {
    match algorithm {
        RouteAlgorithm::AStar => Box::new(AStarPlanner),
        RouteAlgorithm::Dijkstra => Box::new(DijkstraPlanner),
        RouteAlgorithm::QLearning => Box::new(
            QLearningPlanner::new(q_learning.clone()).with_cancellation(cancel.clone()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn planners_report_their_algorithm() {
        assert_eq!(AStarPlanner.algorithm(), RouteAlgorithm::AStar);
        assert_eq!(DijkstraPlanner.algorithm(), RouteAlgorithm::Dijkstra);
        assert_eq!(
            QLearningPlanner::default().algorithm(),
            RouteAlgorithm::QLearning
        );
    }

    #[test]
    fn select_planner_chooses_correct_type() {
        let config = QLearningConfig::default();
        let cancel = CancellationToken::new();
        for algorithm in RouteAlgorithm::ALL {
            assert_eq!(
                select_planner(algorithm, &config, &cancel).algorithm(),
                algorithm
            );
        }
    }

    #[test]
    fn unknown_goal_is_reported_before_searching() {
        let store = GraphStore::from(GraphBuilder::new().airport("AAA", 0.0, 0.0).build());
        assert_eq!(
            AStarPlanner.plan(&store, "AAA", "ZZZ"),
            RouteOutcome::UnknownAirport {
                code: "ZZZ".to_string()
            }
        );
    }

    #[test]
    fn same_endpoint_is_a_zero_length_route() {
        let store = GraphStore::from(GraphBuilder::new().airport("AAA", 0.0, 0.0).build());
        let outcome = QLearningPlanner::default().plan(&store, "AAA", "AAA");
        assert_eq!(
            outcome,
            RouteOutcome::Found {
                path: vec!["AAA".to_string()],
                distance: 0.0,
            }
        );
    }
}
