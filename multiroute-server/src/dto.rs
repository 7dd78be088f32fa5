//! Request and response payloads.

use multiroute_core::{Error as CoreError, GeoCoordinate};
use serde::{Deserialize, Serialize};

/// Query string of `/route` and `/route/geojson`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RouteQuery {
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
}

impl RouteQuery {
    /// Validated start and end coordinates
    pub fn endpoints(&self) -> Result<(GeoCoordinate, GeoCoordinate), CoreError> {
        let start = GeoCoordinate::new(self.start_lat, self.start_lon)?;
        let end = GeoCoordinate::new(self.end_lat, self.end_lon)?;
        Ok((start, end))
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub graph_loaded: bool,
    pub nodes: usize,
    pub edges: usize,
}
