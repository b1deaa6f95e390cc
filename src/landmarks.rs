//! Named natural landmarks, passed through with all their tags.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::crawl::TileSink;
use crate::error::TileError;
use crate::models::{Feature, FeatureCollection, MapExtent, PointGeometry, TileCoord};
use crate::normalize::RunStats;
use crate::overpass::{Element, OverpassResponse};

/// Node ID followed by every OSM tag of the node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NaturalProperties {
    pub id: i64,
    #[serde(flatten)]
    pub tags: BTreeMap<String, String>,
}

/// Collects natural nodes across tiles. Nodes on a shared tile edge are
/// reported twice; the first copy is kept.
#[derive(Debug)]
pub struct NaturalCollector {
    extent: MapExtent,
    places: BTreeMap<i64, Feature<NaturalProperties>>,
    stats: RunStats,
}

impl NaturalCollector {
    pub fn new(extent: MapExtent) -> Self {
        Self {
            extent,
            places: BTreeMap::new(),
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Feature collection sorted by node ID
    pub fn finish(mut self) -> (FeatureCollection<NaturalProperties>, RunStats) {
        self.stats.output = self.places.len();
        let features = self.places.into_values().collect();
        (FeatureCollection::new(features), self.stats)
    }
}

impl TileSink for NaturalCollector {
    fn ingest(&mut self, tile: TileCoord, response: &OverpassResponse) -> Result<(), TileError> {
        let mut staged = Vec::new();
        let mut stats = RunStats::default();

        for element in &response.elements {
            let Element::Node(node) = element else {
                continue;
            };
            stats.input += 1;

            let Some((lon, lat)) = node.position() else {
                self.stats.no_geometry += 1;
                return Err(TileError::MissingGeometry { node_id: node.id });
            };
            if !self.extent.contains(lon, lat) {
                stats.outside += 1;
                continue;
            }
            if node.tag("name").is_none() {
                stats.unnamed += 1;
                continue;
            }

            let mut tags = node.tags.clone();
            tags.remove("id");
            stats.valid += 1;
            staged.push((
                node.id,
                Feature::new(
                    PointGeometry::from(geo_types::Point::new(lon, lat)),
                    NaturalProperties { id: node.id, tags },
                ),
            ));
        }

        debug!("{}: {} natural places", tile, staged.len());
        for (id, feature) in staged {
            self.places.entry(id).or_insert(feature);
        }
        self.stats.merge(&stats);
        Ok(())
    }
}
