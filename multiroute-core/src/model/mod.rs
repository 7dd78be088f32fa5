//! Data model for multimodal routing
//!
//! Contains the mode layers, graph components and the composed network.

pub mod components;
pub mod geodesy;
pub mod mode;
pub mod network;

pub use components::{MultimodalEdge, MultimodalNode, NodeKey};
pub use geodesy::{GeoCoordinate, geodesic_distance};
pub use mode::{EdgeMode, Layer};
pub use network::{GraphStats, MultimodalDiGraph, MultimodalGraph};
