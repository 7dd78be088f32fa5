use log::{info, warn};
use rayon::prelude::*;

use super::cache::{load_graph, save_graph};
use super::compose::compose_layers;
use super::config::GraphConfig;
use super::extract::{CsvEdgeListSource, EdgeListSource};
use super::layer::{ModeLayer, build_mode_layer};
use super::transfers::{PositionTable, TransferConfig, link_layers};
use crate::{Error, model::Layer, model::MultimodalGraph};

/// Creates the multimodal graph described by the configuration.
///
/// A valid cache short-circuits the build. Otherwise the three layers are
/// extracted, built, composed and linked, and the result is written to the
/// cache when one is configured.
///
/// # Errors
///
/// Returns an error if the source data is missing or malformed and no
/// valid cache exists.
pub fn create_multimodal_graph(config: &GraphConfig) -> Result<MultimodalGraph, Error> {
    if let Some(cache_path) = &config.cache_path
        && cache_path.exists()
    {
        match load_graph(cache_path) {
            Ok(graph) => return Ok(graph),
            Err(e) => warn!("Ignoring graph cache: {e}"),
        }
    }

    validate_config(config)?;

    let source = CsvEdgeListSource::new(config);
    let speeds = Layer::ALL.map(|layer| (layer, config.speed_kmh(layer)));
    let graph = build_multimodal_graph(&source, &speeds, &config.transfers)?;

    if let Some(cache_path) = &config.cache_path
        && let Err(e) = save_graph(&graph, cache_path)
    {
        warn!("Failed to write graph cache {}: {e}", cache_path.display());
    }

    // Extraction and linking allocate a lot of short-lived memory that
    // is not always returned to the system. This call will release all
    // free memory from the tail of the heap.
    //
    // # Safety
    //
    // This call is safe to use on linux with glibc implementation
    // which is checked by the cfg attribute in compile time.
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    unsafe {
        if libc::malloc_trim(0) == 0 {
            log::debug!("Memory trimming released nothing");
        } else {
            log::debug!("Successfully trimmed unused heap memory");
        }
    }

    Ok(graph)
}

/// Builds the graph from any edge-list source: one layer per
/// `(layer, speed)` pair, composed in the given order and linked.
///
/// # Errors
///
/// Returns the first extraction or layer-building error.
pub fn build_multimodal_graph<S>(
    source: &S,
    speeds: &[(Layer, f64)],
    transfers: &TransferConfig,
) -> Result<MultimodalGraph, Error>
where
    S: EdgeListSource + Sync,
{
    let layers = speeds
        .par_iter()
        .map(|&(layer, speed_kmh)| {
            let raw = source.edge_list(layer)?;
            build_mode_layer(&raw, layer, speed_kmh)
        })
        .collect::<Result<Vec<ModeLayer>, Error>>()?;

    let positions = PositionTable::from_layers(&layers);
    let mut graph = compose_layers(&layers);
    drop(layers);

    link_layers(&mut graph, &positions, transfers)?;

    info!(
        "Multimodal graph built successfully: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

fn validate_config(config: &GraphConfig) -> Result<(), Error> {
    for layer in Layer::ALL {
        let source = config.layer(layer);
        if !source.edges_path.exists() {
            return Err(Error::GraphLoad(format!(
                "{layer} edge list not found: {} (and no valid cache)",
                source.edges_path.display()
            )));
        }
        if let Some(nodes) = &source.nodes_path
            && !nodes.exists()
        {
            return Err(Error::GraphLoad(format!(
                "{layer} node list not found: {}",
                nodes.display()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::loading::LayerSource;
    use crate::model::{EdgeMode, NodeKey};

    fn write_layer(dir: &Path, name: &str, edges: &str, nodes: &str) -> LayerSource {
        let edges_path = dir.join(format!("{name}_edges.csv"));
        let nodes_path = dir.join(format!("{name}_nodes.csv"));
        fs::write(&edges_path, edges).unwrap();
        fs::write(&nodes_path, nodes).unwrap();
        LayerSource::new(edges_path, Some(nodes_path))
    }

    fn config(dir: &Path) -> GraphConfig {
        let nodes = "id,lat,lon\n1,52.0,4.0\n2,52.0045,4.0\n3,52.02,4.0\n";
        GraphConfig {
            walk: write_layer(dir, "walk", "u,v,length\n1,2,500\n2,1,500\n", nodes),
            bike: write_layer(dir, "bike", "u,v,length\n1,2,500\n", nodes),
            car: write_layer(dir, "car", "u,v,length\n2,3,2000\n", nodes),
            transfers: TransferConfig::default(),
            cache_path: Some(dir.join("graph.json")),
        }
    }

    #[test]
    fn builds_links_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        let graph = create_multimodal_graph(&config).unwrap();

        // walk {1,2}, bike {1,2}, car {2,3}
        assert_eq!(graph.node_count(), 6);
        let stats = graph.stats();
        assert_eq!(stats.edges_by_mode[&EdgeMode::Walk], 2);
        assert_eq!(stats.edges_by_mode[&EdgeMode::Bike], 1);
        assert_eq!(stats.edges_by_mode[&EdgeMode::Car], 1);
        // 1: walk->bike; 2: walk->bike, walk->car, bike->car
        assert_eq!(stats.edges_by_mode[&EdgeMode::Transfer], 4);
        assert!(graph.validate().is_ok());
        assert!(config.cache_path.as_ref().unwrap().exists());

        // Second call is served from the cache even without sources
        fs::remove_file(&config.walk.edges_path).unwrap();
        let cached = create_multimodal_graph(&config).unwrap();
        assert_eq!(cached.stats(), stats);
        assert!(cached.node_index(&NodeKey::new(3, Layer::Car)).is_some());
    }

    #[test]
    fn invalid_cache_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::write(config.cache_path.as_ref().unwrap(), "not json").unwrap();

        let graph = create_multimodal_graph(&config).unwrap();
        assert_eq!(graph.node_count(), 6);
    }

    #[test]
    fn missing_sources_without_cache_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.cache_path = None;
        fs::remove_file(&config.car.edges_path).unwrap();

        let err = create_multimodal_graph(&config).unwrap_err();
        assert!(matches!(err, Error::GraphLoad(_)));
    }

    #[test]
    fn malformed_layer_aborts_build() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.cache_path = None;
        fs::write(&config.bike.edges_path, "from_node,to_node\n1,2\n").unwrap();

        assert!(matches!(
            create_multimodal_graph(&config),
            Err(Error::GraphExtraction {
                layer: Layer::Bike,
                ..
            })
        ));
    }
}
