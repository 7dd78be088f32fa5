//! Transportation modes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// One of the independently sourced road networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Walk,
    Bike,
    Car,
}

impl Layer {
    /// All layers, in the order they are composed and linked
    pub const ALL: [Layer; 3] = [Layer::Walk, Layer::Bike, Layer::Car];

    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Walk => "walk",
            Layer::Bike => "bike",
            Layer::Car => "car",
        }
    }

    /// Travel speed used when the configuration does not set one, km/h
    pub fn default_speed_kmh(self) -> f64 {
        match self {
            Layer::Walk => 5.0,
            Layer::Bike => 15.0,
            Layer::Car => 40.0,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walk" | "walking" => Ok(Layer::Walk),
            "bike" | "cycling" => Ok(Layer::Bike),
            "car" | "driving" => Ok(Layer::Car),
            other => Err(Error::InvalidData(format!("Unknown layer '{other}'"))),
        }
    }
}

/// Mode attached to a graph edge. Transfers only exist between layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
    Walk,
    Bike,
    Car,
    Transfer,
}

impl EdgeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeMode::Walk => "walk",
            EdgeMode::Bike => "bike",
            EdgeMode::Car => "car",
            EdgeMode::Transfer => "transfer",
        }
    }
}

impl From<Layer> for EdgeMode {
    fn from(layer: Layer) -> Self {
        match layer {
            Layer::Walk => EdgeMode::Walk,
            Layer::Bike => EdgeMode::Bike,
            Layer::Car => EdgeMode::Car,
        }
    }
}

impl fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_names_round_trip_through_from_str() {
        for layer in Layer::ALL {
            assert_eq!(layer.as_str().parse::<Layer>().unwrap(), layer);
        }
        assert_eq!("cycling".parse::<Layer>().unwrap(), Layer::Bike);
        assert!("tram".parse::<Layer>().is_err());
    }

    #[test]
    fn edge_modes_serialize_lowercase() {
        let json = serde_json::to_string(&EdgeMode::Transfer).unwrap();
        assert_eq!(json, "\"transfer\"");
        assert_eq!(EdgeMode::from(Layer::Car), EdgeMode::Car);
    }
}
