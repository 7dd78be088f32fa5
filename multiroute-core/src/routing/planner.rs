use log::debug;
use petgraph::graph::NodeIndex;

use super::dijkstra::dijkstra_path;
use crate::{Error, model::MultimodalGraph};

/// Time-optimal node path from `start` to `end`, both inclusive.
///
/// # Errors
///
/// Returns [`Error::InvalidNodeIndex`] for nodes outside the graph and
/// [`Error::NoPathFound`] when `end` is unreachable from `start`.
pub fn plan_route(
    graph: &MultimodalGraph,
    start: NodeIndex,
    end: NodeIndex,
) -> Result<Vec<NodeIndex>, Error> {
    let (Some(from), Some(to)) = (graph.node(start), graph.node(end)) else {
        return Err(Error::InvalidNodeIndex);
    };

    match dijkstra_path(graph, start, end) {
        Some(path) => {
            debug!(
                "Path {} -> {} found: {} nodes, {:.2} minutes",
                from.key,
                to.key,
                path.nodes.len(),
                path.cost
            );
            Ok(path.nodes)
        }
        None => Err(Error::NoPathFound {
            from: from.key,
            to: to.key,
        }),
    }
}
