//! Minimum-cost flow by successive shortest augmenting paths.
//!
//! Arc costs must be non-negative. Each round runs Dijkstra on reduced
//! costs (Johnson potentials) over the residual network and pushes the
//! bottleneck along the cheapest path, so the flow of every value
//! reached is a minimum-cost flow of that value.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Capacity used for arcs that are effectively unbounded.
pub const UNBOUNDED: i64 = i64::MAX / 4;

/// Slack for float comparisons on path costs.
const EPSILON: f64 = 1e-9;

/// Handle to an arc added with [`MinCostFlow::add_arc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcId(usize);

#[derive(Debug, Clone)]
struct Arc {
    to: usize,
    capacity: i64,
    flow: i64,
    cost: f64,
}

impl Arc {
    fn residual(&self) -> i64 {
        self.capacity - self.flow
    }
}

/// Result of a flow computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowResult {
    pub flow: i64,
    pub cost: f64,
}

/// A directed flow network with per-arc capacity and cost.
#[derive(Debug, Clone, Default)]
pub struct MinCostFlow {
    adjacency: Vec<Vec<usize>>,
    // Arc 2k is a forward arc, 2k + 1 its residual twin.
    arcs: Vec<Arc>,
}

impl MinCostFlow {
    /// Create a network with `nodes` nodes numbered from zero.
    pub fn new(nodes: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); nodes],
            arcs: Vec::new(),
        }
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self) -> usize {
        self.adjacency.push(Vec::new());
        self.adjacency.len() - 1
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Add an arc `from -> to` carrying up to `capacity` units at `cost` each.
    ///
    /// # Panics
    ///
    /// Panics if either node does not exist, the capacity is negative or
    /// the cost is negative or not finite. These are programming errors
    /// in the network construction.
    pub fn add_arc(&mut self, from: usize, to: usize, capacity: i64, cost: f64) -> ArcId {
        assert!(from < self.adjacency.len() && to < self.adjacency.len());
        assert!(capacity >= 0, "negative capacity");
        assert!(cost.is_finite() && cost >= 0.0, "cost must be non-negative");

        let id = self.arcs.len();
        self.arcs.push(Arc {
            to,
            capacity,
            flow: 0,
            cost,
        });
        self.arcs.push(Arc {
            to: from,
            capacity: 0,
            flow: 0,
            cost: -cost,
        });
        self.adjacency[from].push(id);
        self.adjacency[to].push(id + 1);
        ArcId(id)
    }

    /// Flow currently carried by an arc.
    pub fn flow_on(&self, arc: ArcId) -> i64 {
        self.arcs[arc.0].flow
    }

    /// Push up to `limit` units from `source` to `sink` at minimum cost.
    ///
    /// Returns the amount pushed, which is less than `limit` when the
    /// network cannot carry more, and the cost of that flow.
    pub fn solve(&mut self, source: usize, sink: usize, limit: i64) -> FlowResult {
        let n = self.adjacency.len();
        let mut potential = vec![0.0f64; n];
        let mut result = FlowResult {
            flow: 0,
            cost: 0.0,
        };

        while result.flow < limit {
            let Some(previous) = self.shortest_path(source, &mut potential) else {
                break;
            };
            if previous[sink].is_none() {
                break;
            }

            let mut push = limit - result.flow;
            let mut node = sink;
            while let Some(arc) = previous[node] {
                push = push.min(self.arcs[arc].residual());
                node = self.arcs[arc ^ 1].to;
            }

            let mut node = sink;
            while let Some(arc) = previous[node] {
                self.arcs[arc].flow += push;
                self.arcs[arc ^ 1].flow -= push;
                result.cost += push as f64 * self.arcs[arc].cost;
                node = self.arcs[arc ^ 1].to;
            }
            result.flow += push;
        }

        result
    }

    /// Dijkstra over reduced costs. Updates potentials and returns the
    /// arc used to reach each node, or `None` if nothing was reachable
    /// beyond the source.
    fn shortest_path(&self, source: usize, potential: &mut [f64]) -> Option<Vec<Option<usize>>> {
        let n = self.adjacency.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut previous: Vec<Option<usize>> = vec![None; n];
        let mut heap = BinaryHeap::new();

        dist[source] = 0.0;
        heap.push(Candidate {
            cost: 0.0,
            node: source,
        });

        while let Some(Candidate { cost, node }) = heap.pop() {
            if cost > dist[node] + EPSILON {
                continue;
            }
            for &arc_id in &self.adjacency[node] {
                let arc = &self.arcs[arc_id];
                if arc.residual() <= 0 {
                    continue;
                }
                let reduced = (arc.cost + potential[node] - potential[arc.to]).max(0.0);
                let next = cost + reduced;
                if next + EPSILON < dist[arc.to] {
                    dist[arc.to] = next;
                    previous[arc.to] = Some(arc_id);
                    heap.push(Candidate {
                        cost: next,
                        node: arc.to,
                    });
                }
            }
        }

        if previous.iter().all(Option::is_none) {
            return None;
        }

        for (p, d) in potential.iter_mut().zip(&dist) {
            if d.is_finite() {
                *p += d;
            }
        }
        Some(previous)
    }
}

/// Heap entry ordered so the cheapest candidate pops first.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f64,
    node: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_cheaper_of_two_paths() {
        // 0 -> 1 -> 3 costs 1 + 1, 0 -> 2 -> 3 costs 5 + 5
        let mut net = MinCostFlow::new(4);
        let a = net.add_arc(0, 1, 2, 1.0);
        net.add_arc(1, 3, 2, 1.0);
        let b = net.add_arc(0, 2, 2, 5.0);
        net.add_arc(2, 3, 2, 5.0);

        let result = net.solve(0, 3, 3);
        assert_eq!(result.flow, 3);
        assert_eq!(result.cost, 2.0 * 2.0 + 10.0);
        assert_eq!(net.flow_on(a), 2);
        assert_eq!(net.flow_on(b), 1);
    }

    #[test]
    fn stops_at_max_flow() {
        let mut net = MinCostFlow::new(3);
        net.add_arc(0, 1, 4, 1.0);
        net.add_arc(1, 2, 3, 1.0);

        let result = net.solve(0, 2, 10);
        assert_eq!(result.flow, 3);
        assert_eq!(result.cost, 6.0);
    }

    #[test]
    fn unreachable_sink() {
        let mut net = MinCostFlow::new(3);
        net.add_arc(0, 1, 4, 1.0);
        assert_eq!(
            net.solve(0, 2, 5),
            FlowResult {
                flow: 0,
                cost: 0.0
            }
        );
    }

    #[test]
    fn reroutes_through_residual_arcs() {
        // Classic case where the greedy first path must be partly undone.
        //   0 -> 1 (1, c1), 0 -> 2 (1, c4), 1 -> 2 (1, c1),
        //   1 -> 3 (1, c4), 2 -> 3 (1, c1)
        let mut net = MinCostFlow::new(4);
        net.add_arc(0, 1, 1, 1.0);
        net.add_arc(0, 2, 1, 4.0);
        let middle = net.add_arc(1, 2, 1, 1.0);
        net.add_arc(1, 3, 1, 4.0);
        net.add_arc(2, 3, 1, 1.0);

        let result = net.solve(0, 3, 2);
        assert_eq!(result.flow, 2);
        // Optimal: 0-1-3 and 0-2-3, total 10; the middle arc is unused.
        assert_eq!(result.cost, 10.0);
        assert_eq!(net.flow_on(middle), 0);
    }

    #[test]
    fn add_node_extends_network() {
        let mut net = MinCostFlow::new(1);
        let n = net.add_node();
        assert_eq!(n, 1);
        assert_eq!(net.node_count(), 2);
        net.add_arc(0, n, UNBOUNDED, 0.0);
        assert_eq!(net.solve(0, n, 7).flow, 7);
    }
}
