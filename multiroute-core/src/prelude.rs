pub use crate::{COLOCATED_TRANSFER_TIME, MAX_TRANSFER_DISTANCE, PROXIMATE_TRANSFER_TIME};

// Re-export key components
pub use crate::loading::{
    CsvEdgeListSource, EdgeListSource, GraphConfig, LayerSource, LinkStrategy, RawEdge,
    RawEdgeList, TransferConfig, build_multimodal_graph, create_multimodal_graph,
};
pub use crate::model::{
    EdgeMode, GeoCoordinate, GraphStats, Layer, MultimodalEdge, MultimodalGraph, MultimodalNode,
    NodeKey,
};
pub use crate::routing::multimodal_routing::multimodal_routing;
pub use crate::routing::{CostModel, Route, Segment};

// Core scalar types
pub use crate::Error;
pub use crate::GraphNodeId;
pub use crate::LocationId;
pub use crate::Minutes;
