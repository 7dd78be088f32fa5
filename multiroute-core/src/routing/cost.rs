use serde::Deserialize;

use crate::{Minutes, model::EdgeMode};

/// Monetary cost of traversing edges, in currency units.
///
/// Costs accrue per edge: a car segment made of five edges costs five
/// times `car_cost_per_edge`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CostModel {
    pub walk_cost_per_edge: f64,
    pub bike_cost_per_edge: f64,
    pub car_cost_per_edge: f64,
    pub transfer_cost_per_edge: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            walk_cost_per_edge: 0.0,
            bike_cost_per_edge: 0.0,
            car_cost_per_edge: 20.0,
            transfer_cost_per_edge: 0.0,
        }
    }
}

impl CostModel {
    /// Cost of one edge of the given mode. The flat per-edge rates do not
    /// depend on travel time yet.
    pub fn edge_cost(&self, mode: EdgeMode, _time: Minutes) -> f64 {
        match mode {
            EdgeMode::Walk => self.walk_cost_per_edge,
            EdgeMode::Bike => self.bike_cost_per_edge,
            EdgeMode::Car => self.car_cost_per_edge,
            EdgeMode::Transfer => self.transfer_cost_per_edge,
        }
    }
}
