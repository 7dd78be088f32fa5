//! Multimodal graph components - nodes and edges

use std::fmt;

use geo::Point;
use serde::{Deserialize, Serialize};

use super::{EdgeMode, Layer};
use crate::{FALLBACK_EDGE_TIME, LocationId, Minutes};

/// Mode-namespaced node identity.
///
/// The same physical location appearing in two layers yields two distinct
/// keys, so layers never collide before they are explicitly linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    /// Original location id from the map-data extraction
    pub location: LocationId,
    pub layer: Layer,
}

impl NodeKey {
    pub fn new(location: LocationId, layer: Layer) -> Self {
        Self { location, layer }
    }

    /// True when both keys stand for the same physical location
    pub fn is_colocated_with(&self, other: &NodeKey) -> bool {
        self.location == other.location
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.location, self.layer)
    }
}

/// Multimodal graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultimodalNode {
    pub key: NodeKey,
    /// Node coordinates (x = longitude, y = latitude), if known
    pub geometry: Option<Point<f64>>,
}

impl MultimodalNode {
    pub fn new(key: NodeKey, geometry: Option<Point<f64>>) -> Self {
        Self { key, geometry }
    }

    pub fn lat(&self) -> Option<f64> {
        self.geometry.map(|p| p.y())
    }

    pub fn lon(&self) -> Option<f64> {
        self.geometry.map(|p| p.x())
    }

    /// `[lat, lon]` pair as reported in itineraries
    pub fn lat_lon(&self) -> Option<[f64; 2]> {
        self.geometry.map(|p| [p.y(), p.x()])
    }
}

/// Multimodal graph edge.
///
/// Weight always equals travel time; the constructors are the only way to
/// create an edge so the invariant cannot be broken from outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultimodalEdge {
    mode: EdgeMode,
    /// Length in meters
    length: f64,
    time: Minutes,
    weight: Minutes,
}

impl MultimodalEdge {
    /// Road edge of a mode layer. Unknown length falls back to a fixed
    /// travel time of one minute.
    pub fn road(layer: Layer, length: Option<f64>, speed_kmh: f64) -> Self {
        let (length, time) = match length {
            Some(meters) => (meters, meters / 1000.0 / speed_kmh * 60.0),
            None => (0.0, FALLBACK_EDGE_TIME),
        };
        Self::with_time(EdgeMode::from(layer), length, time)
    }

    /// Mode switch at the same physical location
    pub fn colocated_transfer(time: Minutes) -> Self {
        Self::with_time(EdgeMode::Transfer, 0.0, time)
    }

    /// Mode switch between two nearby locations `distance` meters apart
    pub fn proximate_transfer(distance: f64, time: Minutes) -> Self {
        Self::with_time(EdgeMode::Transfer, distance, time)
    }

    fn with_time(mode: EdgeMode, length: f64, time: Minutes) -> Self {
        Self {
            mode,
            length,
            time,
            weight: time,
        }
    }

    pub fn mode(&self) -> EdgeMode {
        self.mode
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn time(&self) -> Minutes {
        self.time
    }

    pub fn weight(&self) -> Minutes {
        self.weight
    }

    pub fn is_transfer(&self) -> bool {
        self.mode == EdgeMode::Transfer
    }

    /// `weight == time >= 0`, finite. Edges restored from a cache are
    /// checked against this before the graph is accepted.
    pub fn is_consistent(&self) -> bool {
        self.time.is_finite() && self.time >= 0.0 && self.weight == self.time && self.length >= 0.0
    }
}
