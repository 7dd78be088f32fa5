//! Map-data extraction boundary.
//!
//! Parsing raw map extracts is delegated to an external tool that exports
//! per-mode edge lists; this module reads those lists.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use geo::Point;
use hashbrown::HashMap;
use log::{debug, info};

use super::config::GraphConfig;
use crate::{
    Error, LocationId,
    model::{GeoCoordinate, Layer},
};

const SOURCE_COLUMNS: &[&str] = &["u", "source", "from", "src"];
const TARGET_COLUMNS: &[&str] = &["v", "target", "to", "dst"];
const LENGTH_COLUMNS: &[&str] = &["length", "length_m", "distance"];
const NODE_ID_COLUMNS: &[&str] = &["id", "node_id", "osm_id"];
const LAT_COLUMNS: &[&str] = &["lat", "latitude", "y"];
const LON_COLUMNS: &[&str] = &["lon", "lng", "longitude", "x"];

/// Edge of a raw per-mode edge list, keyed by original location ids
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEdge {
    pub source: LocationId,
    pub target: LocationId,
    /// Geometry length in meters, if the extraction knows it
    pub length: Option<f64>,
}

/// One mode's network as delivered by the map-data extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEdgeList {
    pub edges: Vec<RawEdge>,
    /// Coordinates per original location id (x = lon, y = lat)
    pub positions: HashMap<LocationId, Point<f64>>,
}

impl RawEdgeList {
    pub fn new(edges: Vec<RawEdge>) -> Self {
        Self {
            edges,
            positions: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_position(mut self, location: LocationId, lat: f64, lon: f64) -> Self {
        self.positions.insert(location, Point::new(lon, lat));
        self
    }
}

/// Supplies per-mode edge lists to the graph builder
pub trait EdgeListSource {
    /// # Errors
    ///
    /// Returns [`Error::GraphExtraction`] when the layer's input is malformed.
    fn edge_list(&self, layer: Layer) -> Result<RawEdgeList, Error>;
}

impl EdgeListSource for HashMap<Layer, RawEdgeList> {
    fn edge_list(&self, layer: Layer) -> Result<RawEdgeList, Error> {
        self.get(&layer)
            .cloned()
            .ok_or_else(|| Error::extraction(layer, "no edge list provided"))
    }
}

/// Reads edge and node CSV exports listed in a [`GraphConfig`]
#[derive(Debug, Clone)]
pub struct CsvEdgeListSource<'a> {
    config: &'a GraphConfig,
}

impl<'a> CsvEdgeListSource<'a> {
    pub fn new(config: &'a GraphConfig) -> Self {
        Self { config }
    }
}

impl EdgeListSource for CsvEdgeListSource<'_> {
    fn edge_list(&self, layer: Layer) -> Result<RawEdgeList, Error> {
        let source = self.config.layer(layer);
        info!(
            "Extracting {layer} graph from {}",
            source.edges_path.display()
        );

        let edges = read_edges(layer, open(layer, &source.edges_path)?)?;
        let positions = match &source.nodes_path {
            Some(path) => read_positions(layer, open(layer, path)?)?,
            None => HashMap::new(),
        };

        info!(
            "{layer} graph extracted: {} edges, {} positioned locations",
            edges.len(),
            positions.len()
        );
        Ok(RawEdgeList { edges, positions })
    }
}

fn open(layer: Layer, path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|e| {
        Error::extraction(layer, format!("failed to open '{}': {e}", path.display()))
    })
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| candidates.contains(&h.trim().to_ascii_lowercase().as_str()))
}

fn require_column(
    layer: Layer,
    headers: &csv::StringRecord,
    candidates: &[&str],
    what: &str,
) -> Result<usize, Error> {
    find_column(headers, candidates).ok_or_else(|| {
        Error::extraction(
            layer,
            format!("no {what} column (expected one of {candidates:?})"),
        )
    })
}

fn parse_id(layer: Layer, value: &str, line: u64) -> Result<LocationId, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::extraction(layer, format!("line {line}: invalid location id '{value}'")))
}

fn parse_coordinate(layer: Layer, value: &str, line: u64) -> Result<f64, Error> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::extraction(layer, format!("line {line}: invalid coordinate '{value}'")))
}

fn parse_position(layer: Layer, lat: &str, lon: &str, line: u64) -> Result<Point<f64>, Error> {
    let lat = parse_coordinate(layer, lat, line)?;
    let lon = parse_coordinate(layer, lon, line)?;
    GeoCoordinate::new(lat, lon)
        .map(GeoCoordinate::to_point)
        .map_err(|e| Error::extraction(layer, format!("line {line}: {e}")))
}

/// Next CSV row, with malformed rows reported against the layer
fn next_record(
    layer: Layer,
    record: Result<csv::StringRecord, csv::Error>,
) -> Result<csv::StringRecord, Error> {
    record.map_err(|e| Error::extraction(layer, format!("malformed row: {e}")))
}

pub(crate) fn read_edges<R: Read>(layer: Layer, reader: R) -> Result<Vec<RawEdge>, Error> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();

    let source_col = require_column(layer, &headers, SOURCE_COLUMNS, "source")?;
    let target_col = require_column(layer, &headers, TARGET_COLUMNS, "target")?;
    let length_col = find_column(&headers, LENGTH_COLUMNS);
    if length_col.is_none() {
        debug!("{layer} edge list has no length column, using fallback edge time");
    }

    let mut edges = Vec::new();
    for record in csv.records() {
        let record = next_record(layer, record)?;
        let line = record.position().map_or(0, csv::Position::line);

        let source = parse_id(layer, record.get(source_col).unwrap_or_default(), line)?;
        let target = parse_id(layer, record.get(target_col).unwrap_or_default(), line)?;
        let length = match length_col.and_then(|col| record.get(col)).map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<f64>() {
                Ok(meters) if meters.is_finite() && meters >= 0.0 => Some(meters),
                _ => {
                    return Err(Error::extraction(
                        layer,
                        format!("line {line}: invalid length '{raw}'"),
                    ));
                }
            },
        };

        edges.push(RawEdge {
            source,
            target,
            length,
        });
    }

    Ok(edges)
}

pub(crate) fn read_positions<R: Read>(
    layer: Layer,
    reader: R,
) -> Result<HashMap<LocationId, Point<f64>>, Error> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();

    let id_col = require_column(layer, &headers, NODE_ID_COLUMNS, "node id")?;
    let lat_col = require_column(layer, &headers, LAT_COLUMNS, "latitude")?;
    let lon_col = require_column(layer, &headers, LON_COLUMNS, "longitude")?;

    let mut positions = HashMap::new();
    for record in csv.records() {
        let record = next_record(layer, record)?;
        let line = record.position().map_or(0, csv::Position::line);

        let id = parse_id(layer, record.get(id_col).unwrap_or_default(), line)?;
        let point = parse_position(
            layer,
            record.get(lat_col).unwrap_or_default(),
            record.get(lon_col).unwrap_or_default(),
            line,
        )?;
        positions.insert(id, point);
    }

    Ok(positions)
}
