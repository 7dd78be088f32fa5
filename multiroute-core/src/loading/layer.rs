use geo::Point;
use log::info;

use super::extract::RawEdgeList;
use crate::{
    Error,
    model::{Layer, MultimodalEdge, MultimodalGraph, MultimodalNode, NodeKey},
};

/// Mode-tagged, mode-namespaced network of a single layer
#[derive(Debug, Clone)]
pub struct ModeLayer {
    pub layer: Layer,
    pub(crate) graph: MultimodalGraph,
}

impl ModeLayer {
    pub fn graph(&self) -> &MultimodalGraph {
        &self.graph
    }

    /// Positioned nodes of the layer in node order
    pub fn positions(&self) -> impl Iterator<Item = (NodeKey, Point<f64>)> + '_ {
        self.graph
            .nodes()
            .filter_map(|(_, node)| node.geometry.map(|point| (node.key, point)))
    }
}

/// Builds one mode layer from a raw edge list.
///
/// Every node id is namespaced with the layer; every edge gets the layer's
/// mode, a travel time derived from its length and `speed_kmh`, and a
/// weight equal to that time. Edges are neither dropped nor added.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] if the speed is not a positive number.
pub fn build_mode_layer(
    raw: &RawEdgeList,
    layer: Layer,
    speed_kmh: f64,
) -> Result<ModeLayer, Error> {
    if !speed_kmh.is_finite() || speed_kmh <= 0.0 {
        return Err(Error::InvalidData(format!(
            "Speed for {layer} layer must be positive, got {speed_kmh}"
        )));
    }

    info!("Building {layer} layer at {speed_kmh} km/h");

    let mut graph = MultimodalGraph::new();
    for edge in &raw.edges {
        let source = graph.add_node(namespaced_node(raw, edge.source, layer));
        let target = graph.add_node(namespaced_node(raw, edge.target, layer));
        graph.add_edge(
            source,
            target,
            MultimodalEdge::road(layer, edge.length, speed_kmh),
        );
    }

    info!(
        "{layer} layer built: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(ModeLayer { layer, graph })
}

fn namespaced_node(raw: &RawEdgeList, location: i64, layer: Layer) -> MultimodalNode {
    MultimodalNode::new(
        NodeKey::new(location, layer),
        raw.positions.get(&location).copied(),
    )
}
