//! Tabular Q-learning route search.
//!
//! Each query trains a fresh [`QTable`] by random exploration and then walks
//! the greedy policy from the start airport. Nothing is cached between
//! queries, so training dominates the cost of this planner: it grows with
//! `episodes x graph size` and is bounded by the time budget and cancellation
//! token checked before every episode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::QLearningConfig;
use crate::graph::{Graph, NodeIndex};
use crate::path::SearchPath;

/// Shared flag used to abandon a running training loop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Action values for every (airport, outgoing route) pair.
///
/// `values(node)[i]` belongs to the `i`-th edge of `graph.neighbours(node)`.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Vec<Vec<f64>>,
}

impl QTable {
    /// Zero-initialised table shaped after `graph`.
    pub fn new(graph: &Graph) -> Self {
        let values = (0..graph.node_count())
            .map(|node| vec![0.0; graph.neighbours(node).len()])
            .collect();
        Self { values }
    }

    pub fn values(&self, node: NodeIndex) -> &[f64] {
        &self.values[node]
    }

    /// Position of the highest-valued action; the first one wins ties.
    ///
    /// Edges are ordered by target, so a tie goes to the smaller identifier.
    pub fn best_action(&self, node: NodeIndex) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (position, &value) in self.values[node].iter().enumerate() {
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((position, value)),
            }
        }
        best.map(|(position, _)| position)
    }

    /// Highest action value at `node`, or zero when it has no actions.
    pub fn max_value(&self, node: NodeIndex) -> f64 {
        self.values[node]
            .iter()
            .copied()
            .fold(None, |best: Option<f64>, value| {
                Some(best.map_or(value, |b| b.max(value)))
            })
            .unwrap_or(0.0)
    }
}

/// Counters collected while training.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingStats {
    pub episodes: usize,
    pub steps: usize,
    pub goal_hits: usize,
}

/// Reason training stopped before completing every episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingInterrupt {
    TimedOut,
    Cancelled,
}

/// Terminal state of the greedy path extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The policy reached the goal.
    Success(SearchPath),
    /// The policy reached an airport without outgoing routes.
    DeadEnd(NodeIndex),
    /// The step cap ran out before the goal was reached.
    Incomplete,
}

/// Result of a complete Q-learning query.
#[derive(Debug, Clone, PartialEq)]
pub enum QLearningOutcome {
    Extracted(Extraction),
    Interrupted(TrainingInterrupt),
}

/// Train a fresh table and extract the greedy path from `start` to `goal`.
pub fn find_route_q_learning(
    graph: &Graph,
    start: NodeIndex,
    goal: NodeIndex,
    config: &QLearningConfig,
    cancel: &CancellationToken,
) -> QLearningOutcome {
    if start == goal {
        return QLearningOutcome::Extracted(Extraction::Success(SearchPath {
            nodes: vec![start],
            distance: 0.0,
        }));
    }

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    debug!(seed, episodes = config.episodes, "training q-learning policy");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let deadline = config.time_budget().map(|budget| Instant::now() + budget);

    match train(graph, goal, config, &mut rng, deadline, cancel) {
        Ok(table) => QLearningOutcome::Extracted(extract_path(
            graph,
            &table,
            start,
            goal,
            config.max_steps,
        )),
        Err(interrupt) => QLearningOutcome::Interrupted(interrupt),
    }
}

/// Run `config.episodes` epsilon-greedy episodes towards `goal`.
///
/// Every episode starts at a uniformly sampled airport and ends on reaching
/// the goal, on an airport without routes, or after
/// `config.max_episode_steps` transitions.
pub fn train<R: Rng>(
    graph: &Graph,
    goal: NodeIndex,
    config: &QLearningConfig,
    rng: &mut R,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> Result<QTable, TrainingInterrupt> {
    let mut table = QTable::new(graph);
    let mut stats = TrainingStats::default();
    let node_count = graph.node_count();
    if node_count == 0 {
        return Ok(table);
    }

    for episode in 0..config.episodes {
        if cancel.is_cancelled() {
            debug!(episode, "q-learning training cancelled");
            return Err(TrainingInterrupt::Cancelled);
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            debug!(episode, "q-learning training ran out of time");
            return Err(TrainingInterrupt::TimedOut);
        }

        let epsilon = config.epsilon(episode);
        let mut state = rng.random_range(0..node_count);
        let mut steps = 0usize;

        while state != goal && steps < config.max_episode_steps {
            let actions = graph.neighbours(state);
            let Some(greedy) = table.best_action(state) else {
                break;
            };
            let action = if rng.random::<f64>() < epsilon {
                rng.random_range(0..actions.len())
            } else {
                greedy
            };

            let edge = actions[action];
            let reward = if edge.target == goal {
                config.goal_reward
            } else {
                -edge.distance
            };
            let target = reward + config.gamma * table.max_value(edge.target);
            let value = &mut table.values[state][action];
            *value += config.alpha * (target - *value);

            state = edge.target;
            steps += 1;
        }

        stats.episodes += 1;
        stats.steps += steps;
        if state == goal {
            stats.goal_hits += 1;
        }
    }

    debug!(
        episodes = stats.episodes,
        steps = stats.steps,
        goal_hits = stats.goal_hits,
        "q-learning training finished"
    );
    Ok(table)
}

/// Follow the highest-valued action from `start` towards `goal`.
///
/// The goal check runs before the cap check, so a hop that lands on the goal
/// succeeds even once `max_steps` is used up. The walk gives up when the step
/// counter exceeds `max_steps` anywhere else.
pub fn extract_path(
    graph: &Graph,
    table: &QTable,
    start: NodeIndex,
    goal: NodeIndex,
    max_steps: usize,
) -> Extraction {
    let mut nodes = vec![start];
    let mut distance = 0.0;
    let mut current = start;
    let mut steps = 0usize;

    while current != goal {
        let Some(action) = table.best_action(current) else {
            return Extraction::DeadEnd(current);
        };
        let edge = graph.neighbours(current)[action];
        nodes.push(edge.target);
        distance += edge.distance;
        current = edge.target;
        steps += 1;

        if current != goal && steps > max_steps {
            return Extraction::Incomplete;
        }
    }

    Extraction::Success(SearchPath { nodes, distance })
}
