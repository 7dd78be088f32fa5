//! Interlayer transfer edges.
//!
//! Transfers are the only edges that let a route switch mode. Two nodes of
//! different layers are linked when they share an original location
//! (co-located transfer) or lie within a distance threshold of each other
//! (proximate transfer, inserted in both directions).

use geo::Point;
use hashbrown::HashMap;
use log::{debug, info};
use rayon::prelude::*;
use rstar::{AABB, RTree, primitives::GeomWithData};
use serde::Deserialize;

use super::layer::ModeLayer;
use crate::{
    COLOCATED_TRANSFER_TIME, Error, LocationId, MAX_TRANSFER_DISTANCE, Minutes,
    PROXIMATE_TRANSFER_TIME,
    model::{MultimodalEdge, MultimodalGraph, NodeKey, geodesic_distance},
};

/// Lower bound of meters per degree of latitude (at the equator), reduced
/// so that search envelopes always over-cover the threshold
const METERS_PER_DEGREE: f64 = 110_000.0;

/// How cross-layer neighbours are searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStrategy {
    /// Examine every cross-layer node pair
    Pairwise,
    /// R-tree candidate search, exact distance check on candidates
    #[default]
    Indexed,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Proximate transfer threshold in meters
    pub max_distance_m: f64,
    pub colocated_time: Minutes,
    pub proximate_time: Minutes,
    /// Also link co-located nodes in the reverse direction
    pub symmetric_colocated: bool,
    pub strategy: LinkStrategy,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_distance_m: MAX_TRANSFER_DISTANCE,
            colocated_time: COLOCATED_TRANSFER_TIME,
            proximate_time: PROXIMATE_TRANSFER_TIME,
            symmetric_colocated: false,
            strategy: LinkStrategy::Indexed,
        }
    }
}

/// Positions of all coordinate-bearing nodes of all layers, in layer
/// order and node order within each layer
#[derive(Debug, Clone, Default)]
pub struct PositionTable {
    entries: Vec<(NodeKey, Point<f64>)>,
}

impl PositionTable {
    pub fn from_layers(layers: &[ModeLayer]) -> Self {
        Self {
            entries: layers.iter().flat_map(ModeLayer::positions).collect(),
        }
    }

    pub fn push(&mut self, key: NodeKey, point: Point<f64>) {
        self.entries.push((key, point));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(NodeKey, Point<f64>)> for PositionTable {
    fn from_iter<T: IntoIterator<Item = (NodeKey, Point<f64>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Transfer edge to insert between two namespaced nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferLink {
    pub from: NodeKey,
    pub to: NodeKey,
    pub edge: MultimodalEdge,
}

/// Computes the transfer edges for a position table.
///
/// Both strategies return the same links in the same order: pairs are
/// visited as `(i, j)` with `i < j` in table order.
pub fn find_transfer_links(table: &PositionTable, config: &TransferConfig) -> Vec<TransferLink> {
    let per_node = match config.strategy {
        LinkStrategy::Pairwise => pairwise_links(table, config),
        LinkStrategy::Indexed => indexed_links(table, config),
    };
    per_node.into_iter().flatten().collect()
}

/// Inserts transfer edges into a composed graph. Returns the number of
/// edges added.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] if the table names a node the graph
/// does not contain.
pub fn link_layers(
    graph: &mut MultimodalGraph,
    table: &PositionTable,
    config: &TransferConfig,
) -> Result<usize, Error> {
    info!(
        "Adding interlayer transfer edges between {} positioned nodes ({:?} search)",
        table.len(),
        config.strategy
    );

    let links = find_transfer_links(table, config);
    for link in &links {
        let (Some(from), Some(to)) = (graph.node_index(&link.from), graph.node_index(&link.to))
        else {
            return Err(Error::InvalidData(format!(
                "Transfer {} -> {} references a node missing from the graph",
                link.from, link.to
            )));
        };
        graph.add_edge(from, to, link.edge);
    }

    info!("Added {} transfer edges", links.len());
    Ok(links.len())
}

fn pairwise_links(table: &PositionTable, config: &TransferConfig) -> Vec<Vec<TransferLink>> {
    let entries = &table.entries;
    (0..entries.len())
        .into_par_iter()
        .map(|i| {
            let mut links = Vec::new();
            for j in i + 1..entries.len() {
                link_pair(entries[i], entries[j], config, &mut links);
            }
            links
        })
        .collect()
}

fn indexed_links(table: &PositionTable, config: &TransferConfig) -> Vec<Vec<TransferLink>> {
    let entries = &table.entries;

    let tree = RTree::bulk_load(
        entries
            .iter()
            .enumerate()
            .map(|(idx, (_, point))| GeomWithData::new([point.x(), point.y()], idx))
            .collect(),
    );

    // Co-located nodes are linked whatever their coordinates say
    let mut by_location: HashMap<LocationId, Vec<usize>> = HashMap::new();
    for (idx, (key, _)) in entries.iter().enumerate() {
        by_location.entry(key.location).or_default().push(idx);
    }

    debug!(
        "Indexed {} positions at {} distinct locations",
        entries.len(),
        by_location.len()
    );

    (0..entries.len())
        .into_par_iter()
        .map(|i| {
            let (key, point) = entries[i];

            let mut candidates: Vec<usize> = search_envelopes(point, config.max_distance_m)
                .iter()
                .flat_map(|envelope| tree.locate_in_envelope_intersecting(envelope))
                .map(|hit| hit.data)
                .chain(by_location[&key.location].iter().copied())
                .filter(|&j| j > i)
                .collect();
            candidates.sort_unstable();
            candidates.dedup();

            let mut links = Vec::new();
            for j in candidates {
                link_pair(entries[i], entries[j], config, &mut links);
            }
            links
        })
        .collect()
}

/// Degree-space boxes that contain every point within `meters` of `point`.
/// A box crossing the antimeridian is split in two.
fn search_envelopes(point: Point<f64>, meters: f64) -> Vec<AABB<[f64; 2]>> {
    let dlat = meters / METERS_PER_DEGREE * 1.5;
    let max_lat = (point.y().abs() + dlat).min(90.0);
    let dlon = (meters / (METERS_PER_DEGREE * max_lat.to_radians().cos().max(1e-9)) * 1.5)
        .min(180.0);

    let min_y = point.y() - dlat;
    let max_y = point.y() + dlat;
    let min_x = point.x() - dlon;
    let max_x = point.x() + dlon;

    let mut envelopes = vec![AABB::from_corners([min_x, min_y], [max_x, max_y])];
    if min_x < -180.0 {
        envelopes.push(AABB::from_corners([min_x + 360.0, min_y], [180.0, max_y]));
    }
    if max_x > 180.0 {
        envelopes.push(AABB::from_corners([-180.0, min_y], [max_x - 360.0, max_y]));
    }
    envelopes
}

/// Applies the linking rule to one unordered pair, `a` first in table order
fn link_pair(
    (a, a_point): (NodeKey, Point<f64>),
    (b, b_point): (NodeKey, Point<f64>),
    config: &TransferConfig,
    links: &mut Vec<TransferLink>,
) {
    // Intra-mode connectivity already comes from the road edges
    if a.layer == b.layer {
        return;
    }

    if a.is_colocated_with(&b) {
        let edge = MultimodalEdge::colocated_transfer(config.colocated_time);
        links.push(TransferLink {
            from: a,
            to: b,
            edge,
        });
        if config.symmetric_colocated {
            links.push(TransferLink {
                from: b,
                to: a,
                edge,
            });
        }
        return;
    }

    let distance = geodesic_distance(a_point, b_point);
    if distance <= config.max_distance_m {
        let edge = MultimodalEdge::proximate_transfer(distance, config.proximate_time);
        links.push(TransferLink {
            from: a,
            to: b,
            edge,
        });
        links.push(TransferLink {
            from: b,
            to: a,
            edge,
        });
    }
}
