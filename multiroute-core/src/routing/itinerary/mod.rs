//! Conversion of node paths into per-mode itinerary segments

mod to_geojson;

use itertools::Itertools;
use log::debug;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use super::cost::CostModel;
use crate::{
    Error, Minutes,
    model::{EdgeMode, MultimodalGraph},
};

/// Maximal run of path edges sharing one mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub mode: EdgeMode,
    /// `[lat, lon]` pairs, consecutive duplicates removed
    pub coords: Vec<[f64; 2]>,
    /// Minutes, rounded to one decimal
    pub time: Minutes,
    pub cost: u32,
}

/// Computed itinerary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Route {
    /// Sum of the (rounded) segment times, minutes
    pub total_time: Minutes,
    /// Sum of the segment costs
    pub total_cost: u32,
    pub segments: Vec<Segment>,
}

impl Route {
    fn from_segments(segments: Vec<Segment>) -> Self {
        let total_time = round_to_tenth(segments.iter().map(|s| s.time).sum());
        let total_cost = segments.iter().map(|s| s.cost).sum();
        Self {
            total_time,
            total_cost,
            segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Segment still accumulating edges
struct OpenSegment {
    mode: EdgeMode,
    coords: Vec<[f64; 2]>,
    time: Minutes,
    cost: f64,
}

impl OpenSegment {
    fn new(mode: EdgeMode) -> Self {
        Self {
            mode,
            coords: Vec::new(),
            time: 0.0,
            cost: 0.0,
        }
    }

    fn push_coord(&mut self, coord: [f64; 2]) {
        if self.coords.last() != Some(&coord) {
            self.coords.push(coord);
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn close(self) -> Segment {
        Segment {
            mode: self.mode,
            coords: self.coords,
            time: round_to_tenth(self.time),
            cost: self.cost.round().max(0.0) as u32,
        }
    }
}

fn round_to_tenth(minutes: Minutes) -> Minutes {
    (minutes * 10.0).round() / 10.0
}

/// Turns a node path into mode-homogeneous segments with time and cost.
///
/// Between consecutive path nodes the cheapest parallel edge is used.
/// A path of a single node produces an empty route.
///
/// # Errors
///
/// Returns [`Error::InvalidNodeIndex`] for nodes outside the graph and
/// [`Error::InvalidData`] when two consecutive path nodes are not joined
/// by an edge.
pub fn assemble_route(
    graph: &MultimodalGraph,
    path: &[NodeIndex],
    cost_model: &CostModel,
) -> Result<Route, Error> {
    let mut segments = Vec::new();
    let mut open: Option<OpenSegment> = None;

    for (u, v) in path.iter().copied().tuple_windows() {
        let from = graph.node(u).ok_or(Error::InvalidNodeIndex)?;
        let edge = graph.lowest_weight_edge(u, v).ok_or_else(|| {
            let to = graph.node(v).map_or_else(|| "?".to_string(), |n| n.key.to_string());
            Error::InvalidData(format!("Path step {} -> {to} has no edge", from.key))
        })?;
        let mode = edge.mode();

        if open.as_ref().is_some_and(|segment| segment.mode != mode)
            && let Some(done) = open.take()
        {
            segments.push(done.close());
        }
        let segment = open.get_or_insert_with(|| OpenSegment::new(mode));

        if let Some(coord) = from.lat_lon() {
            segment.push_coord(coord);
        }
        segment.time += edge.time();
        segment.cost += cost_model.edge_cost(mode, edge.time());
    }

    if let Some(mut segment) = open {
        // Destination coordinate closes the last segment
        if let Some(&last) = path.last() {
            let destination = graph.node(last).ok_or(Error::InvalidNodeIndex)?;
            if let Some(coord) = destination.lat_lon() {
                segment.push_coord(coord);
            }
        }
        segments.push(segment.close());
    }

    let route = Route::from_segments(segments);
    debug!(
        "Assembled {} segments: {:.1} minutes, cost {}",
        route.segments.len(),
        route.total_time,
        route.total_cost
    );
    Ok(route)
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::model::{Layer, MultimodalEdge, MultimodalNode, NodeKey};

    fn add(graph: &mut MultimodalGraph, location: i64, layer: Layer, lat: f64) -> NodeIndex {
        graph.add_node(MultimodalNode::new(
            NodeKey::new(location, layer),
            Some(Point::new(4.0, lat)),
        ))
    }

    /// Walk A -> B, co-located transfer at B, drive B -> C
    fn walk_transfer_drive() -> (MultimodalGraph, Vec<NodeIndex>) {
        let mut graph = MultimodalGraph::new();
        let a = add(&mut graph, 1, Layer::Walk, 52.0);
        let b_walk = add(&mut graph, 2, Layer::Walk, 52.0045);
        let b_car = add(&mut graph, 2, Layer::Car, 52.0045);
        let c = add(&mut graph, 3, Layer::Car, 52.02);
        graph.add_edge(a, b_walk, MultimodalEdge::road(Layer::Walk, Some(500.0), 5.0));
        graph.add_edge(b_walk, b_car, MultimodalEdge::colocated_transfer(0.5));
        graph.add_edge(b_car, c, MultimodalEdge::road(Layer::Car, Some(2000.0), 40.0));
        (graph, vec![a, b_walk, b_car, c])
    }

    #[test]
    fn segments_follow_mode_changes() {
        let (graph, path) = walk_transfer_drive();
        let route = assemble_route(&graph, &path, &CostModel::default()).unwrap();

        let summary: Vec<_> = route
            .segments
            .iter()
            .map(|s| (s.mode, s.time, s.cost))
            .collect();
        assert_eq!(
            summary,
            vec![
                (EdgeMode::Walk, 6.0, 0),
                (EdgeMode::Transfer, 0.5, 0),
                (EdgeMode::Car, 3.0, 20)
            ]
        );
        assert_eq!(route.total_time, 9.5);
        assert_eq!(route.total_cost, 20);

        assert_eq!(route.segments[0].coords, vec![[52.0, 4.0]]);
        assert_eq!(route.segments[1].coords, vec![[52.0045, 4.0]]);
        assert_eq!(route.segments[2].coords, vec![[52.0045, 4.0], [52.02, 4.0]]);
    }

    #[test]
    fn single_node_path_is_empty() {
        let (graph, path) = walk_transfer_drive();
        let route = assemble_route(&graph, &path[..1], &CostModel::default()).unwrap();

        assert!(route.is_empty());
        assert_eq!(route.total_time, 0.0);
        assert_eq!(route.total_cost, 0);
    }

    #[test]
    fn car_cost_accrues_per_edge() {
        let mut graph = MultimodalGraph::new();
        let nodes: Vec<_> = (0..4)
            .map(|i| add(&mut graph, i, Layer::Car, 52.0 + 0.001 * i as f64))
            .collect();
        for pair in nodes.windows(2) {
            graph.add_edge(pair[0], pair[1], MultimodalEdge::road(Layer::Car, Some(200.0), 40.0));
        }

        let route = assemble_route(&graph, &nodes, &CostModel::default()).unwrap();

        assert_eq!(route.segments.len(), 1);
        assert_eq!(route.segments[0].cost, 60);
        assert_eq!(route.segments[0].coords.len(), 4);
        // 3 x 0.3 minutes
        assert_eq!(route.segments[0].time, 0.9);
    }

    #[test]
    fn duplicate_coordinates_are_collapsed() {
        let mut graph = MultimodalGraph::new();
        let a = add(&mut graph, 1, Layer::Walk, 52.0);
        let b = add(&mut graph, 2, Layer::Walk, 52.0);
        let c = add(&mut graph, 3, Layer::Walk, 52.001);
        graph.add_edge(a, b, MultimodalEdge::road(Layer::Walk, Some(0.0), 5.0));
        graph.add_edge(b, c, MultimodalEdge::road(Layer::Walk, Some(100.0), 5.0));

        let route = assemble_route(&graph, &[a, b, c], &CostModel::default()).unwrap();
        assert_eq!(route.segments[0].coords, vec![[52.0, 4.0], [52.001, 4.0]]);
    }

    #[test]
    fn cheapest_parallel_edge_is_reported() {
        let mut graph = MultimodalGraph::new();
        let a = add(&mut graph, 1, Layer::Bike, 52.0);
        let b = add(&mut graph, 2, Layer::Bike, 52.01);
        graph.add_edge(a, b, MultimodalEdge::road(Layer::Bike, Some(3000.0), 15.0));
        graph.add_edge(a, b, MultimodalEdge::road(Layer::Bike, Some(1500.0), 15.0));

        let route = assemble_route(&graph, &[a, b], &CostModel::default()).unwrap();
        assert_eq!(route.total_time, 6.0);
    }

    #[test]
    fn missing_edge_is_reported() {
        let (graph, path) = walk_transfer_drive();
        let broken = [path[0], path[3]];
        assert!(matches!(
            assemble_route(&graph, &broken, &CostModel::default()),
            Err(Error::InvalidData(_))
        ));
    }
}
