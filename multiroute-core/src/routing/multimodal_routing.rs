use log::{debug, info};
use petgraph::graph::NodeIndex;

use super::{CostModel, Route, assemble_route, plan_route};
use crate::{
    Error,
    model::{GeoCoordinate, MultimodalGraph},
};

/// Fastest multimodal itinerary between two coordinates.
///
/// Both coordinates are snapped to their nearest graph node (any layer),
/// the time-optimal path between the two nodes is computed and then cut
/// into mode-homogeneous segments priced with `cost_model`.
///
/// # Errors
///
/// * [`Error::NodeNotFound`] when the graph has no node with coordinates
/// * [`Error::NoPathFound`] when the snapped end node is unreachable
pub fn multimodal_routing(
    graph: &MultimodalGraph,
    start: &GeoCoordinate,
    end: &GeoCoordinate,
    cost_model: &CostModel,
) -> Result<Route, Error> {
    let start_node = locate(graph, start)?;
    let end_node = locate(graph, end)?;

    let path = plan_route(graph, start_node, end_node)?;
    let route = assemble_route(graph, &path, cost_model)?;

    info!(
        "Route ({:.5}, {:.5}) -> ({:.5}, {:.5}): {} segments, {:.1} minutes, cost {}",
        start.lat(),
        start.lon(),
        end.lat(),
        end.lon(),
        route.segments.len(),
        route.total_time,
        route.total_cost
    );
    Ok(route)
}

fn locate(graph: &MultimodalGraph, coordinate: &GeoCoordinate) -> Result<NodeIndex, Error> {
    let (idx, distance) =
        graph
            .nearest_node(&coordinate.to_point())
            .ok_or(Error::NodeNotFound {
                lat: coordinate.lat(),
                lon: coordinate.lon(),
            })?;

    if let Some(node) = graph.node(idx) {
        debug!(
            "Snapped ({}, {}) to {} at {distance:.1} m",
            coordinate.lat(),
            coordinate.lon(),
            node.key
        );
    }
    Ok(idx)
}
