use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

use crate::Minutes;

#[derive(Copy, Clone, PartialEq)]
pub(super) struct State {
    pub(super) cost: Minutes,
    pub(super) node: NodeIndex,
}

// Costs are never NaN: every edge weight is a finite, non-negative time
impl Eq for State {}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap),
        // node index breaks ties so pops are deterministic
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
