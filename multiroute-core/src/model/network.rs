//! Composed multimodal network

use std::collections::BTreeMap;

use geo::Point;
use hashbrown::HashMap;
use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex},
    visit::EdgeRef,
};
use serde::Serialize;

use super::{EdgeMode, MultimodalEdge, MultimodalNode, NodeKey, geodesic_distance};
use crate::Error;

/// Directed multigraph: petgraph's `Graph` allows parallel edges
pub type MultimodalDiGraph = DiGraph<MultimodalNode, MultimodalEdge>;

/// Multimodal graph with a lookup from namespaced node keys to indices.
///
/// Built once, then only read. Request handling borrows it.
#[derive(Debug, Clone, Default)]
pub struct MultimodalGraph {
    pub(crate) graph: MultimodalDiGraph,
    pub(crate) index: HashMap<NodeKey, NodeIndex>,
}

/// Summary of a built graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub edges_by_mode: BTreeMap<EdgeMode, usize>,
    pub is_directed: bool,
    pub is_multigraph: bool,
}

impl MultimodalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, or returns the existing index for the same key.
    /// A coordinate missing on the stored node is filled from the new one.
    pub(crate) fn add_node(&mut self, node: MultimodalNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.key) {
            let existing = &mut self.graph[idx];
            if existing.geometry.is_none() {
                existing.geometry = node.geometry;
            }
            return idx;
        }
        let key = node.key;
        let idx = self.graph.add_node(node);
        self.index.insert(key, idx);
        idx
    }

    pub(crate) fn add_edge(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        edge: MultimodalEdge,
    ) -> EdgeIndex {
        self.graph.add_edge(source, target, edge)
    }

    pub fn graph(&self) -> &MultimodalDiGraph {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&MultimodalNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_index(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &MultimodalNode)> {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }

    /// Outgoing edges of a node
    pub fn edges(
        &self,
        node: NodeIndex,
    ) -> impl Iterator<Item = EdgeReference<'_, MultimodalEdge>> {
        self.graph.edges_directed(node, Direction::Outgoing)
    }

    /// Cheapest of the (possibly parallel) edges from `source` to `target`.
    /// Equal weights resolve to the lowest edge index.
    pub fn lowest_weight_edge(
        &self,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Option<&MultimodalEdge> {
        self.graph
            .edges_connecting(source, target)
            .min_by(|a, b| {
                a.weight()
                    .weight()
                    .total_cmp(&b.weight().weight())
                    .then(a.id().cmp(&b.id()))
            })
            .map(|edge| edge.weight())
    }

    /// Finds the node closest to the given point by geodesic distance.
    ///
    /// Linear scan over nodes that carry coordinates; ties go to the node
    /// encountered first. Nodes whose distance cannot be computed (positions
    /// outside WGS84 ranges) are skipped. Returns `None` when no node is left.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, f64)> {
        let mut best: Option<(NodeIndex, f64)> = None;
        for idx in self.graph.node_indices() {
            let Some(geometry) = self.graph[idx].geometry else {
                continue;
            };
            let distance = geodesic_distance(*point, geometry);
            if !distance.is_finite() {
                continue;
            }
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((idx, distance));
            }
        }
        best
    }

    pub fn stats(&self) -> GraphStats {
        let mut edges_by_mode = BTreeMap::new();
        for edge in self.graph.edge_weights() {
            *edges_by_mode.entry(edge.mode()).or_insert(0) += 1;
        }

        GraphStats {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            edges_by_mode,
            is_directed: true,
            is_multigraph: true,
        }
    }

    /// Copy of the graph with every transfer edge removed, leaving the
    /// mode layers disconnected from each other
    pub fn without_transfers(&self) -> Self {
        let graph = self.graph.filter_map(
            |_, node| Some(node.clone()),
            |_, edge| (!edge.is_transfer()).then_some(*edge),
        );
        Self {
            graph,
            index: self.index.clone(),
        }
    }

    /// Checks the edge invariants (`weight == time >= 0`) and the key index
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] describing the first violation found.
    pub fn validate(&self) -> Result<(), Error> {
        for edge in self.graph.edge_references() {
            if !edge.weight().is_consistent() {
                return Err(Error::InvalidData(format!(
                    "Edge {} -> {} has inconsistent attributes: {:?}",
                    self.graph[edge.source()].key,
                    self.graph[edge.target()].key,
                    edge.weight()
                )));
            }
        }

        if self.index.len() != self.graph.node_count() {
            return Err(Error::InvalidData(format!(
                "Node index holds {} keys for {} nodes",
                self.index.len(),
                self.graph.node_count()
            )));
        }
        for (key, &idx) in &self.index {
            if self.graph.node_weight(idx).map(|n| &n.key) != Some(key) {
                return Err(Error::InvalidData(format!(
                    "Node index entry {key} points to a different node"
                )));
            }
        }

        Ok(())
    }
}
