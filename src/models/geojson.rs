//! Minimal GeoJSON document types shared by the wire and output layers.

use geo_types::Point;
use serde::{Deserialize, Serialize};

/// GeoJSON `Point` geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub geo_type: GeometryType,
    pub coordinates: [f64; 2], // [lon, lat]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
}

impl From<Point<f64>> for PointGeometry {
    fn from(point: Point<f64>) -> Self {
        Self {
            geo_type: GeometryType::Point,
            coordinates: [point.x(), point.y()],
        }
    }
}

impl From<PointGeometry> for Point<f64> {
    fn from(geometry: PointGeometry) -> Self {
        Point::new(geometry.coordinates[0], geometry.coordinates[1])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature<P> {
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    pub geometry: PointGeometry,
    pub properties: P,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    Feature,
}

impl<P> Feature<P> {
    pub fn new(geometry: PointGeometry, properties: P) -> Self {
        Self {
            feature_type: FeatureType::Feature,
            geometry,
            properties,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type")]
    pub collection_type: CollectionType,
    pub features: Vec<Feature<P>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionType {
    FeatureCollection,
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            collection_type: CollectionType::FeatureCollection,
            features,
        }
    }
}
