use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

use serde::Serialize;

use crate::routing::{RouteAlgorithm, RouteOutcome, RouteResult};

/// Result of one strategy within a [`QueryReport`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StrategyReport {
    /// Whether `result` is a real route rather than a sentinel.
    pub found: bool,
    #[serde(flatten)]
    pub result: RouteResult,
    /// Wall-clock time spent in the strategy. Informational only.
    pub elapsed_ms: f64,
}

impl StrategyReport {
    pub fn new(outcome: &RouteOutcome, elapsed: Duration) -> Self {
        Self {
            found: outcome.is_found(),
            result: outcome.to_result(),
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// Structured comparison of strategies for one source/destination pair.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryReport {
    pub source: String,
    pub destination: String,
    pub results: BTreeMap<RouteAlgorithm, StrategyReport>,
}

impl QueryReport {
    pub fn get(&self, algorithm: RouteAlgorithm) -> Option<&StrategyReport> {
        self.results.get(&algorithm)
    }

    /// Plain-text rendering, one block per strategy.
    pub fn render_text(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "Route {} -> {}", self.source, self.destination);
        for (algorithm, report) in &self.results {
            let _ = writeln!(buffer);
            if report.found {
                let hops = report.result.path.len().saturating_sub(1);
                let _ = writeln!(
                    buffer,
                    "[{algorithm}] {:.1} km, {hops} hop(s), {:.2} ms",
                    report.result.distance, report.elapsed_ms
                );
                let _ = writeln!(buffer, "  {}", report.result.path.join(" -> "));
            } else {
                let message = report.result.path.first().map(String::as_str).unwrap_or("");
                let _ = writeln!(
                    buffer,
                    "[{algorithm}] {message} ({:.2} ms)",
                    report.elapsed_ms
                );
            }
        }
        buffer
    }
}
