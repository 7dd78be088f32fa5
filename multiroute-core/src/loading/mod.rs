//! This module is responsible for reading per-mode edge lists and building
//! the multimodal routing graph out of them.

mod builder;
pub mod cache;
mod compose;
mod config;
mod extract;
mod layer;
mod transfers;

pub use builder::{build_multimodal_graph, create_multimodal_graph};
pub use cache::{load_graph, save_graph};
pub use compose::compose_layers;
pub use config::{GraphConfig, LayerSource};
pub use extract::{CsvEdgeListSource, EdgeListSource, RawEdge, RawEdgeList};
pub use layer::{ModeLayer, build_mode_layer};
pub use transfers::{
    LinkStrategy, PositionTable, TransferConfig, TransferLink, find_transfer_links, link_layers,
};
