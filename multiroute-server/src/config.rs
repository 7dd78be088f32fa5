//! Service configuration file.
//!
//! ```toml
//! [server]
//! port = 8000
//!
//! [graph.walk]
//! edges_path = "data/walk_edges.csv"
//! nodes_path = "data/walk_nodes.csv"
//!
//! [cost]
//! car_cost_per_edge = 20.0
//! ```

use std::path::{Path, PathBuf};

use multiroute_core::{GraphConfig, routing::CostModel};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// HTTP listener and request limits
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Requests running longer than this are answered with 504
    pub request_timeout_secs: u64,
    /// Caps both in-flight requests and running searches. A search whose
    /// request timed out still counts until it finishes.
    pub max_concurrent_requests: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 30,
            max_concurrent_requests: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    pub graph: GraphConfig,
    #[serde(default)]
    pub cost: CostModel,
}

impl ServerConfig {
    /// Reads a TOML configuration file. Relative graph paths are resolved
    /// against the directory containing the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: ServerConfig =
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.graph = config.graph.with_base_dir(base);
        Ok(config)
    }
}
