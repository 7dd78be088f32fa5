//! Multimodal (walk / bike / car) routing engine.
//!
//! The crate builds one weighted directed multigraph out of independently
//! sourced per-mode road networks, stitches the mode layers together with
//! transfer edges and answers fastest-itinerary queries on it.

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::Error;
pub use loading::{GraphConfig, create_multimodal_graph};
pub use model::{GeoCoordinate, Layer, MultimodalGraph};
pub use routing::multimodal_routing::multimodal_routing;

/// Travel time and edge weight, in minutes
pub type Minutes = f64;
/// Original (un-namespaced) location id as supplied by the map-data extraction
pub type LocationId = i64;
/// Index of a node inside the multimodal graph
pub type GraphNodeId = petgraph::graph::NodeIndex;

/// Maximum geodesic distance (meters) between two nodes of different
/// layers for them to be joined by a proximate transfer
pub const MAX_TRANSFER_DISTANCE: f64 = 10.0;
/// Cost of switching mode at the same physical location
pub const COLOCATED_TRANSFER_TIME: Minutes = 0.5;
/// Cost of switching mode between two nearby locations
pub const PROXIMATE_TRANSFER_TIME: Minutes = 2.0;
/// Travel time of a road edge whose length is unknown
pub const FALLBACK_EDGE_TIME: Minutes = 1.0;
