use log::info;
use petgraph::visit::EdgeRef;

use super::layer::ModeLayer;
use crate::model::MultimodalGraph;

/// Unions mode layers into a single multigraph.
///
/// Node keys are namespaced per layer, so nothing collides or gets
/// overwritten; the result has no cross-layer edges yet.
pub fn compose_layers(layers: &[ModeLayer]) -> MultimodalGraph {
    info!("Merging {} mode layers", layers.len());

    let mut composed = MultimodalGraph::new();
    for layer in layers {
        let graph = layer.graph.graph();
        let remap: Vec<_> = graph
            .node_indices()
            .map(|idx| composed.add_node(graph[idx].clone()))
            .collect();

        for edge in graph.edge_references() {
            composed.add_edge(
                remap[edge.source().index()],
                remap[edge.target().index()],
                *edge.weight(),
            );
        }
    }

    info!(
        "Merged graph: {} nodes, {} edges",
        composed.node_count(),
        composed.edge_count()
    );
    composed
}
