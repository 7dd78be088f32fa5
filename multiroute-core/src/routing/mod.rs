//! Route planning on the multimodal graph

pub mod cost;
pub mod dijkstra;
pub mod itinerary;
pub mod multimodal_routing;
pub mod planner;

pub use cost::CostModel;
pub use itinerary::{Route, Segment, assemble_route};
pub use planner::plan_route;
