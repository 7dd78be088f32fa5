//! Serialized form of a built graph.
//!
//! The snapshot keeps every node and edge attribute so a loaded graph
//! routes exactly like the one that was saved.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::info;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    model::{MultimodalEdge, MultimodalGraph, MultimodalNode},
};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct GraphSnapshot {
    version: u32,
    nodes: Vec<MultimodalNode>,
    edges: Vec<EdgeRecord>,
}

#[derive(Serialize, Deserialize)]
struct EdgeRecord {
    source: usize,
    target: usize,
    #[serde(flatten)]
    edge: MultimodalEdge,
}

/// Writes the graph to `path` as JSON
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_graph(graph: &MultimodalGraph, path: &Path) -> Result<(), Error> {
    info!("Saving graph to {}", path.display());

    let inner = graph.graph();
    let snapshot = GraphSnapshot {
        version: SNAPSHOT_VERSION,
        nodes: inner.node_weights().cloned().collect(),
        edges: inner
            .edge_references()
            .map(|edge| EdgeRecord {
                source: edge.source().index(),
                target: edge.target().index(),
                edge: *edge.weight(),
            })
            .collect(),
    };

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &snapshot)?;
    writer.flush()?;

    info!("Graph saved to {}", path.display());
    Ok(())
}

/// Restores a graph written by [`save_graph`]
///
/// # Errors
///
/// Returns [`Error::GraphLoad`] when the file is missing, unreadable, of
/// another format version, or describes an inconsistent graph.
pub fn load_graph(path: &Path) -> Result<MultimodalGraph, Error> {
    info!("Loading graph from {}", path.display());

    let file = File::open(path)
        .map_err(|e| Error::GraphLoad(format!("cannot open '{}': {e}", path.display())))?;
    let snapshot: GraphSnapshot = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::GraphLoad(format!("cannot parse '{}': {e}", path.display())))?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(Error::GraphLoad(format!(
            "snapshot version {} is not supported (expected {SNAPSHOT_VERSION})",
            snapshot.version
        )));
    }

    let mut graph = MultimodalGraph::new();
    let node_count = snapshot.nodes.len();
    for node in snapshot.nodes {
        graph.add_node(node);
    }
    if graph.node_count() != node_count {
        return Err(Error::GraphLoad("snapshot contains duplicate node keys".into()));
    }

    for record in snapshot.edges {
        if record.source >= node_count || record.target >= node_count {
            return Err(Error::GraphLoad(format!(
                "edge {} -> {} points outside the {node_count} snapshot nodes",
                record.source, record.target
            )));
        }
        graph.add_edge(
            petgraph::graph::NodeIndex::new(record.source),
            petgraph::graph::NodeIndex::new(record.target),
            record.edge,
        );
    }

    graph
        .validate()
        .map_err(|e| Error::GraphLoad(e.to_string()))?;

    info!(
        "Graph loaded from {}: {} nodes, {} edges",
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
