//! Route command handler for comparing strategies between two airports.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use skybee_lib::{QLearningConfig, RouteAlgorithm, RouteEngine};
use tracing::debug;

use skybee_cli::output::{write_report, OutputFormat};

use super::DataArgs;

/// Strategy selector accepted by `--algorithm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    #[value(alias = "astar")]
    AStar,
    Dijkstra,
    #[value(alias = "rl")]
    QLearning,
    /// Every strategy.
    All,
}

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Source airport identifier.
    pub from: String,
    /// Destination airport identifier.
    pub to: String,
    /// Requested strategies; empty means all of them.
    pub algorithms: Vec<AlgorithmArg>,
    /// Training episodes for Q-learning.
    pub episodes: Option<usize>,
    /// Seed for Q-learning exploration.
    pub seed: Option<u64>,
    /// Wall-clock budget for Q-learning training.
    pub rl_timeout_ms: Option<u64>,
    /// JSON file with Q-learning hyperparameters.
    pub rl_config: Option<PathBuf>,
}

impl RouteCommandArgs {
    /// Expand the selectors into a list of strategies in canonical order.
    pub fn strategies(&self) -> Vec<RouteAlgorithm> {
        if self.algorithms.is_empty() || self.algorithms.contains(&AlgorithmArg::All) {
            return RouteAlgorithm::ALL.to_vec();
        }
        let mut strategies: Vec<RouteAlgorithm> = self
            .algorithms
            .iter()
            .filter_map(|choice| match choice {
                AlgorithmArg::AStar => Some(RouteAlgorithm::AStar),
                AlgorithmArg::Dijkstra => Some(RouteAlgorithm::Dijkstra),
                AlgorithmArg::QLearning => Some(RouteAlgorithm::QLearning),
                AlgorithmArg::All => None,
            })
            .collect();
        strategies.sort();
        strategies.dedup();
        strategies
    }

    /// Build the Q-learning configuration. Flags override values from `--rl-config`.
    pub fn q_learning_config(&self) -> Result<QLearningConfig> {
        let mut config = match &self.rl_config {
            Some(path) => QLearningConfig::from_path(path).with_context(|| {
                format!("failed to read Q-learning config from {}", path.display())
            })?,
            None => QLearningConfig::default(),
        };
        if let Some(episodes) = self.episodes {
            config = config.with_episodes(episodes);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(timeout) = self.rl_timeout_ms {
            config = config.with_time_budget(Duration::from_millis(timeout));
        }
        config
            .validate()
            .context("invalid Q-learning configuration")?;
        Ok(config)
    }
}

/// Handle the route subcommand.
///
/// Unknown airports, unreachable destinations, and a dataset that failed to
/// load are reported in the output rather than as command failures.
pub fn handle_route_command(
    data: &DataArgs,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<()> {
    let config = args.q_learning_config()?;
    let strategies = args.strategies();
    debug!(from = %args.from, to = %args.to, ?strategies, "running route command");

    let engine = RouteEngine::new(data.load_store()).with_q_learning_config(config);
    let report = engine.query(&args.from, &args.to, &strategies);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_report(&mut handle, &report, format)
}
