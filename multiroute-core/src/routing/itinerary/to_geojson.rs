use geo::{Coord, LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::{Map, Value as JsonValue, json};

use super::{Route, Segment};
use crate::Error;

impl Route {
    /// Converts the itinerary to a `GeoJSON` `FeatureCollection` with one
    /// feature per segment.
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .segments
            .iter()
            .enumerate()
            .map(|(idx, segment)| segment_feature(idx, segment))
            .collect();

        let mut foreign_members = Map::new();
        foreign_members.insert("total_time".to_string(), json!(self.total_time));
        foreign_members.insert("total_cost".to_string(), json!(self.total_cost));

        FeatureCollection {
            features,
            bbox: None,
            foreign_members: Some(foreign_members),
        }
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn segment_feature(idx: usize, segment: &Segment) -> Feature {
    // Itinerary coordinates are [lat, lon]; GeoJSON wants x = lon, y = lat
    let coords: Vec<Coord<f64>> = segment
        .coords
        .iter()
        .map(|&[lat, lon]| Coord { x: lon, y: lat })
        .collect();

    let geometry = match coords.as_slice() {
        [] => None,
        [single] => Some(Geometry::new(GeoJsonValue::from(&Point::from(*single)))),
        _ => Some(Geometry::new(GeoJsonValue::from(&LineString::new(coords)))),
    };

    let mut properties = Map::new();
    properties.insert("segment_index".to_string(), json!(idx));
    properties.insert(
        "mode".to_string(),
        JsonValue::String(segment.mode.to_string()),
    );
    properties.insert("time".to_string(), json!(segment.time));
    properties.insert("cost".to_string(), json!(segment.cost));

    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdgeMode;

    #[test]
    fn one_feature_per_segment() {
        let route = Route {
            total_time: 6.5,
            total_cost: 0,
            segments: vec![
                Segment {
                    mode: EdgeMode::Walk,
                    coords: vec![[52.0, 4.0], [52.01, 4.0]],
                    time: 6.0,
                    cost: 0,
                },
                Segment {
                    mode: EdgeMode::Transfer,
                    coords: vec![[52.01, 4.0]],
                    time: 0.5,
                    cost: 0,
                },
            ],
        };

        let collection = route.to_geojson();
        assert_eq!(collection.features.len(), 2);

        let first = &collection.features[0];
        match &first.geometry.as_ref().unwrap().value {
            GeoJsonValue::LineString { .. } => {}
            other => panic!("expected a line, got {other:?}"),
        }
        assert_eq!(
            first.properties.as_ref().unwrap()["mode"],
            JsonValue::String("walk".into())
        );
        match &collection.features[1].geometry.as_ref().unwrap().value {
            GeoJsonValue::Point { .. } => {}
            other => panic!("expected a point, got {other:?}"),
        }

        let text = route.to_geojson_string().unwrap();
        assert!(text.contains("\"FeatureCollection\""));
        assert!(text.contains("\"total_time\":6.5"));
    }
}
