use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::graph::{Graph, NodeIndex};

/// Path through the graph with its total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPath {
    /// Nodes from start to goal, both inclusive.
    pub nodes: Vec<NodeIndex>,
    /// Sum of the traversed edge weights in kilometres.
    pub distance: f64,
}

impl SearchPath {
    fn trivial(node: NodeIndex) -> Self {
        Self {
            nodes: vec![node],
            distance: 0.0,
        }
    }
}

/// Run Dijkstra's algorithm (uniform-cost search) from `start` to `goal`.
///
/// Frontier ties resolve to the smaller node index, which is the
/// lexicographically smaller airport identifier.
pub fn find_route_dijkstra(
    graph: &Graph,
    start: NodeIndex,
    goal: NodeIndex,
) -> Option<SearchPath> {
    best_first(graph, start, goal, |_| 0.0, "dijkstra")
}

/// Run A* search guided by the great-circle distance to `goal`.
///
/// Great-circle edge weights satisfy the triangle inequality, so the
/// heuristic is admissible and consistent on loaded datasets. Frontier
/// ties on `f` prefer the lower `g`, then the smaller node index.
pub fn find_route_a_star(
    graph: &Graph,
    start: NodeIndex,
    goal: NodeIndex,
) -> Option<SearchPath> {
    best_first(
        graph,
        start,
        goal,
        |node| graph.straight_line_distance(node, goal),
        "a_star",
    )
}

fn best_first<H>(
    graph: &Graph,
    start: NodeIndex,
    goal: NodeIndex,
    heuristic: H,
    label: &'static str,
) -> Option<SearchPath>
where
    H: Fn(NodeIndex) -> f64,
{
    if start == goal {
        return Some(SearchPath::trivial(start));
    }

    let mut g_score = vec![f64::INFINITY; graph.node_count()];
    let mut parents: Vec<Option<NodeIndex>> = vec![None; graph.node_count()];
    let mut queue = BinaryHeap::new();
    let mut expanded = 0usize;

    g_score[start] = 0.0;
    queue.push(FrontierEntry::new(start, 0.0, heuristic(start)));

    while let Some(entry) = queue.pop() {
        // Skip entries superseded by a cheaper push.
        if entry.cost.0 > g_score[entry.node] {
            continue;
        }
        expanded += 1;

        if entry.node == goal {
            debug!(algorithm = label, expanded, "search reached goal");
            return Some(SearchPath {
                nodes: reconstruct_path(&parents, start, goal),
                distance: g_score[goal],
            });
        }

        for edge in graph.neighbours(entry.node) {
            let next = edge.target;
            let tentative = g_score[entry.node] + edge.distance;
            if tentative < g_score[next] {
                g_score[next] = tentative;
                parents[next] = Some(entry.node);
                queue.push(FrontierEntry::new(next, tentative, heuristic(next)));
            }
        }
    }

    debug!(algorithm = label, expanded, "search exhausted frontier");
    None
}

fn reconstruct_path(
    parents: &[Option<NodeIndex>],
    start: NodeIndex,
    goal: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents[node];
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct FrontierEntry {
    node: NodeIndex,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl FrontierEntry {
    fn new(node: NodeIndex, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap pops the lowest (f, g, node) first.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn frontier_prefers_lower_estimate_then_cost_then_node() {
        let mut heap = BinaryHeap::new();
        heap.push(FrontierEntry::new(3, 50.0, 50.0));
        heap.push(FrontierEntry::new(2, 60.0, 40.0));
        heap.push(FrontierEntry::new(1, 60.0, 40.0));
        heap.push(FrontierEntry::new(0, 10.0, 200.0));

        let order: Vec<NodeIndex> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn start_equal_to_goal_is_trivial() {
        let graph = GraphBuilder::new().airport("AAA", 0.0, 0.0).build();
        let path = find_route_a_star(&graph, 0, 0).expect("trivial path");
        assert_eq!(path, SearchPath::trivial(0));
    }

    #[test]
    fn dijkstra_takes_the_cheaper_detour() {
        let graph = GraphBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 0.0, 0.0)
            .airport("CCC", 0.0, 0.0)
            .route_with_distance("AAA", "CCC", 500.0)
            .route_with_distance("AAA", "BBB", 100.0)
            .route_with_distance("BBB", "CCC", 100.0)
            .build();
        let path = find_route_dijkstra(&graph, 0, 2).expect("path exists");
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert_eq!(path.distance, 200.0);
    }
}
