use std::collections::BinaryHeap;

use hashbrown::HashMap;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use super::state::State;
use crate::{Minutes, model::MultimodalGraph};

/// Fastest node sequence between two nodes
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    /// Sum of edge weights along the path, minutes
    pub cost: Minutes,
    /// Nodes from start to target, both inclusive
    pub nodes: Vec<NodeIndex>,
}

/// Dijkstra's algorithm over edge weights (minutes) with early exit at
/// the target. Returns `None` when the target is unreachable.
pub fn dijkstra_path(
    graph: &MultimodalGraph,
    start: NodeIndex,
    target: NodeIndex,
) -> Option<ShortestPath> {
    let estimated_nodes = graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, Minutes> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    // Start node has distance 0
    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if node == target {
            return Some(ShortestPath {
                cost,
                nodes: trace_back(&predecessors, start, target),
            });
        }

        // Skip if we've found a better path
        if let Some(&best) = distances.get(&node)
            && cost > best
        {
            continue;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_cost = cost + edge.weight().weight();

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, node);
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, node);
                    }
                }
            }
        }
    }

    None
}

/// Follows predecessors backward from target to start
fn trace_back(
    predecessors: &HashMap<NodeIndex, NodeIndex>,
    start: NodeIndex,
    target: NodeIndex,
) -> Vec<NodeIndex> {
    let mut nodes = vec![target];
    let mut current = target;
    while current != start {
        match predecessors.get(&current) {
            Some(&prev) => {
                nodes.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    nodes.reverse();
    nodes
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::model::{Layer, MultimodalEdge, MultimodalNode, NodeKey};

    fn line_graph() -> (MultimodalGraph, Vec<NodeIndex>) {
        let mut graph = MultimodalGraph::new();
        let nodes: Vec<_> = (0..4)
            .map(|i| {
                graph.add_node(MultimodalNode::new(
                    NodeKey::new(i, Layer::Walk),
                    Some(Point::new(4.0, 52.0 + f64::from(i as i32) * 0.001)),
                ))
            })
            .collect();
        // 0 -> 1 -> 2 -> 3 is 3 minutes, 0 -> 3 directly is 5
        for pair in nodes.windows(2) {
            graph.add_edge(pair[0], pair[1], MultimodalEdge::road(Layer::Walk, None, 5.0));
        }
        graph.add_edge(
            nodes[0],
            nodes[3],
            MultimodalEdge::road(Layer::Walk, Some(5000.0 / 12.0), 5.0),
        );
        (graph, nodes)
    }

    #[test]
    fn finds_cheapest_path() {
        let (graph, nodes) = line_graph();
        let path = dijkstra_path(&graph, nodes[0], nodes[3]).unwrap();

        assert_eq!(path.nodes, nodes);
        assert!((path.cost - 3.0).abs() < 1e-9);
    }

    #[test]
    fn start_equals_target() {
        let (graph, nodes) = line_graph();
        let path = dijkstra_path(&graph, nodes[2], nodes[2]).unwrap();

        assert_eq!(path.nodes, vec![nodes[2]]);
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn respects_edge_direction() {
        let (graph, nodes) = line_graph();
        assert!(dijkstra_path(&graph, nodes[3], nodes[0]).is_none());
    }
}
