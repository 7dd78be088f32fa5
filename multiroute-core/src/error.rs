use thiserror::Error;

use crate::model::{Layer, NodeKey};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to extract {layer} graph: {reason}")]
    GraphExtraction { layer: Layer, reason: String },
    #[error("Failed to load graph: {0}")]
    GraphLoad(String),
    #[error("No graph node found near ({lat}, {lon})")]
    NodeNotFound { lat: f64, lon: f64 },
    #[error("No path found between {from} and {to}")]
    NoPathFound { from: NodeKey, to: NodeKey },
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("Invalid node index")]
    InvalidNodeIndex,
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

impl Error {
    pub(crate) fn extraction(layer: Layer, reason: impl Into<String>) -> Self {
        Error::GraphExtraction {
            layer,
            reason: reason.into(),
        }
    }
}
