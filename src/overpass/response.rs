//! Overpass JSON response schema.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::PointGeometry;

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl OverpassResponse {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// One element of the response
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    /// Administrative area
    Area(AreaElement),
    /// Point of interest
    Node(NodeElement),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AreaElement {
    pub id: i64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl AreaElement {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeElement {
    pub id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Present on converted nodes (`out geom`)
    #[serde(default)]
    pub geometry: Option<PointGeometry>,
}

impl NodeElement {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Position as (lon, lat), from the plain coordinates or the geometry
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => Some((lon, lat)),
            _ => self
                .geometry
                .map(|g| (g.coordinates[0], g.coordinates[1])),
        }
    }
}
