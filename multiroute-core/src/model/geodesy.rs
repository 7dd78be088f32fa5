use geo::{Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Geodesic surface distance between two points, in meters
pub fn geodesic_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    Geodesic.distance(a, b)
}

/// Validated WGS84 query coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    lat: f64,
    lon: f64,
}

impl GeoCoordinate {
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoordinate`] when latitude is outside
    /// `[-90, 90]` or longitude outside `[-180, 180]`.
    pub fn new(lat: f64, lon: f64) -> Result<Self, Error> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoordinate(format!(
                "latitude {lat} is outside [-90, 90]"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidCoordinate(format!(
                "longitude {lon} is outside [-180, 180]"
            )));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}
