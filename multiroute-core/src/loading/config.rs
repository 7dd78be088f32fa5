use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::transfers::TransferConfig;
use crate::model::Layer;

/// Where one mode layer comes from
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerSource {
    /// CSV edge list (source, target, length)
    pub edges_path: PathBuf,
    /// CSV node coordinates (id, lat, lon)
    #[serde(default)]
    pub nodes_path: Option<PathBuf>,
    /// Travel speed in km/h, defaults to the layer's typical speed
    #[serde(default)]
    pub speed_kmh: Option<f64>,
}

impl LayerSource {
    pub fn new(edges_path: impl Into<PathBuf>, nodes_path: Option<PathBuf>) -> Self {
        Self {
            edges_path: edges_path.into(),
            nodes_path,
            speed_kmh: None,
        }
    }
}

/// Configuration for building (or loading) the multimodal graph
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphConfig {
    pub walk: LayerSource,
    pub bike: LayerSource,
    pub car: LayerSource,
    #[serde(default)]
    pub transfers: TransferConfig,
    /// Serialized graph. Loaded instead of building when valid,
    /// written after a fresh build.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

impl GraphConfig {
    pub fn layer(&self, layer: Layer) -> &LayerSource {
        match layer {
            Layer::Walk => &self.walk,
            Layer::Bike => &self.bike,
            Layer::Car => &self.car,
        }
    }

    pub fn speed_kmh(&self, layer: Layer) -> f64 {
        self.layer(layer)
            .speed_kmh
            .unwrap_or_else(|| layer.default_speed_kmh())
    }

    /// Resolves relative paths against `base` (usually the directory of
    /// the configuration file)
    #[must_use]
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        for source in [&mut self.walk, &mut self.bike, &mut self.car] {
            resolve(&mut source.edges_path);
            if let Some(nodes) = source.nodes_path.as_mut() {
                resolve(nodes);
            }
        }
        if let Some(cache) = self.cache_path.as_mut() {
            resolve(cache);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_follow_base_dir() {
        let config = GraphConfig {
            walk: LayerSource::new("walk.csv", Some(PathBuf::from("walk_nodes.csv"))),
            bike: LayerSource::new("/abs/bike.csv", None),
            car: LayerSource::new("car.csv", None),
            transfers: TransferConfig::default(),
            cache_path: Some(PathBuf::from("graph.json")),
        }
        .with_base_dir(Path::new("/data"));

        assert_eq!(config.walk.edges_path, PathBuf::from("/data/walk.csv"));
        assert_eq!(
            config.walk.nodes_path,
            Some(PathBuf::from("/data/walk_nodes.csv"))
        );
        assert_eq!(config.bike.edges_path, PathBuf::from("/abs/bike.csv"));
        assert_eq!(config.cache_path, Some(PathBuf::from("/data/graph.json")));
    }

    #[test]
    fn speeds_default_per_layer() {
        let mut config = GraphConfig {
            walk: LayerSource::new("walk.csv", None),
            bike: LayerSource::new("bike.csv", None),
            car: LayerSource::new("car.csv", None),
            transfers: TransferConfig::default(),
            cache_path: None,
        };
        config.car.speed_kmh = Some(50.0);

        assert_eq!(config.speed_kmh(Layer::Walk), 5.0);
        assert_eq!(config.speed_kmh(Layer::Bike), 15.0);
        assert_eq!(config.speed_kmh(Layer::Car), 50.0);
    }
}
