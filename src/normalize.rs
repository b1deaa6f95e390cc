//! Turns raw place nodes into normalized place records.

use tracing::{debug, info};

use crate::config::CountryTable;
use crate::error::{RegionError, TileError};
use crate::models::{MapExtent, PlaceRecord, Tier};
use crate::overpass::NodeElement;
use crate::regions::{parse_membership, RegionRegistry};

/// Why a node produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    OutsideExtent,
    Unnamed,
    UnrecognizedKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Place(PlaceRecord),
    Discarded(Discard),
}

/// Run-level counters, reported once at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub input: usize,
    pub valid: usize,
    pub output: usize,
    pub outside: usize,
    pub no_geometry: usize,
    pub unnamed: usize,
    pub unrecognized: usize,
}

impl RunStats {
    pub fn record(&mut self, outcome: &Normalized) {
        self.input += 1;
        match outcome {
            Normalized::Place(_) => self.valid += 1,
            Normalized::Discarded(Discard::OutsideExtent) => self.outside += 1,
            Normalized::Discarded(Discard::Unnamed) => self.unnamed += 1,
            Normalized::Discarded(Discard::UnrecognizedKind) => self.unrecognized += 1,
        }
    }

    pub fn merge(&mut self, other: &RunStats) {
        self.input += other.input;
        self.valid += other.valid;
        self.output += other.output;
        self.outside += other.outside;
        self.no_geometry += other.no_geometry;
        self.unnamed += other.unnamed;
        self.unrecognized += other.unrecognized;
    }

    pub fn log_summary(&self) {
        info!(
            "Input places: {}, Valid places: {}, Output places: {}",
            self.input, self.valid, self.output
        );
        info!(
            "Outside extent: {}, Invalid geometry: {}, Invalid name: {}, Unrecognized kind: {}",
            self.outside, self.no_geometry, self.unnamed, self.unrecognized
        );
    }
}

/// Normalizes nodes against the regions registered so far
pub struct FeatureNormalizer<'a> {
    registry: &'a RegionRegistry,
    extent: &'a MapExtent,
    countries: &'a CountryTable,
}

impl<'a> FeatureNormalizer<'a> {
    pub fn new(
        registry: &'a RegionRegistry,
        extent: &'a MapExtent,
        countries: &'a CountryTable,
    ) -> Self {
        Self {
            registry,
            extent,
            countries,
        }
    }

    /// Normalize one node.
    ///
    /// A missing geometry or membership tag means the tile payload is
    /// corrupt; an unresolvable region is fatal to the run.
    pub fn normalize(&self, node: &NodeElement) -> Result<Normalized, TileError> {
        if let Some((lon, lat)) = node.position() {
            if !self.extent.contains(lon, lat) {
                debug!(
                    "Node {} is outside the map extent, skipping",
                    node.tag("name").unwrap_or("<unnamed>")
                );
                return Ok(Normalized::Discarded(Discard::OutsideExtent));
            }
        }

        let geometry = node
            .geometry
            .ok_or(TileError::MissingGeometry { node_id: node.id })?;

        let Some(name) = node.tag("name") else {
            return Ok(Normalized::Discarded(Discard::Unnamed));
        };

        let raw_membership = node.tag("region").unwrap_or_default();
        let membership =
            parse_membership(raw_membership).ok_or_else(|| TileError::MalformedMembership {
                node_id: node.id,
                raw: raw_membership.to_string(),
            })?;

        let country = self
            .registry
            .country_of(&membership)
            .and_then(|c| c.country_code.clone());
        let preferred = self.countries.preferred_level(country.as_deref());
        let region = self.registry.resolve(&membership, preferred).ok_or_else(|| {
            RegionError::NoEnclosingRegion {
                node_id: node.id,
                name: name.to_string(),
                preferred,
            }
        })?;

        let Some(tier) = node.tag("place").and_then(Tier::from_place_kind) else {
            return Ok(Normalized::Discarded(Discard::UnrecognizedKind));
        };

        let population = node
            .tag("population")
            .and_then(|p| p.trim().parse::<u64>().ok());

        Ok(Normalized::Place(PlaceRecord {
            osm_id: node.id,
            name: name.to_string(),
            country,
            region: region.display_name(),
            tier,
            population,
            point: geometry.into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountrySettings;
    use crate::models::{AdminLevel, PointGeometry};
    use crate::overpass::AreaElement;

    fn area(id: i64, tags: &[(&str, &str)]) -> AreaElement {
        AreaElement {
            id,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn node(id: i64, lon: f64, lat: f64, tags: &[(&str, &str)]) -> NodeElement {
        NodeElement {
            id,
            lat: Some(lat),
            lon: Some(lon),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            geometry: Some(PointGeometry::from(geo_types::Point::new(lon, lat))),
        }
    }

    fn registry() -> RegionRegistry {
        let mut registry = RegionRegistry::new();
        registry.register_area(&area(
            1,
            &[("name", "France"), ("admin_level", "2"), ("ISO3166-1", "FR")],
        ));
        registry.register_area(&area(
            44,
            &[("name", "Loire-Atlantique"), ("admin_level", "6"), ("ref:INSEE", "44")],
        ));
        registry
    }

    fn extent() -> MapExtent {
        MapExtent::new(-5.0, 40.0, 10.0, 52.0).unwrap()
    }

    #[test]
    fn test_normalize_city() {
        let (registry, extent, countries) = (registry(), extent(), CountryTable::default());
        let normalizer = FeatureNormalizer::new(&registry, &extent, &countries);

        let outcome = normalizer
            .normalize(&node(
                7,
                -1.55,
                47.22,
                &[
                    ("name", "Nantes"),
                    ("place", "city"),
                    ("population", "320732"),
                    ("region", r#"{"2":1;"6":44}"#),
                ],
            ))
            .unwrap();

        let Normalized::Place(place) = outcome else {
            panic!("expected a place, got {:?}", outcome);
        };
        assert_eq!(place.name, "Nantes");
        assert_eq!(place.country.as_deref(), Some("FR"));
        assert_eq!(place.region, "44 Loire-Atlantique");
        assert_eq!(place.tier, Tier::City);
        assert_eq!(place.population, Some(320732));
        assert_eq!(place.lon(), -1.55);
    }

    #[test]
    fn test_country_preference_limits_level() {
        let (registry, extent) = (registry(), extent());
        let mut countries = CountryTable::default();
        countries.insert(
            "FR",
            CountrySettings {
                alvl: AdminLevel(4),
                color: "#ffffff".into(),
            },
        );
        let normalizer = FeatureNormalizer::new(&registry, &extent, &countries);

        let outcome = normalizer
            .normalize(&node(
                8,
                -1.5,
                47.0,
                &[("name", "Rezé"), ("place", "town"), ("region", r#"{"2":1;"6":44}"#)],
            ))
            .unwrap();
        let Normalized::Place(place) = outcome else {
            panic!("expected a place");
        };
        assert_eq!(place.region, "France");
        assert_eq!(place.population, None);
    }

    #[test]
    fn test_discards() {
        let (registry, extent, countries) = (registry(), extent(), CountryTable::default());
        let normalizer = FeatureNormalizer::new(&registry, &extent, &countries);
        let region = ("region", r#"{"2":1}"#);

        let outside = node(1, 20.0, 47.0, &[("name", "Far"), ("place", "city"), region]);
        let unnamed = node(2, 1.0, 47.0, &[("place", "city"), region]);
        let suburb = node(3, 1.0, 47.0, &[("name", "Sub"), ("place", "suburb"), region]);

        assert_eq!(
            normalizer.normalize(&outside).unwrap(),
            Normalized::Discarded(Discard::OutsideExtent)
        );
        assert_eq!(
            normalizer.normalize(&unnamed).unwrap(),
            Normalized::Discarded(Discard::Unnamed)
        );
        assert_eq!(
            normalizer.normalize(&suburb).unwrap(),
            Normalized::Discarded(Discard::UnrecognizedKind)
        );
    }

    #[test]
    fn test_unparsable_population_is_absent() {
        let (registry, extent, countries) = (registry(), extent(), CountryTable::default());
        let normalizer = FeatureNormalizer::new(&registry, &extent, &countries);
        let n = node(
            9,
            1.0,
            47.0,
            &[
                ("name", "Bourg"),
                ("place", "village"),
                ("population", "about 300"),
                ("region", r#"{"2":1}"#),
            ],
        );
        let Normalized::Place(place) = normalizer.normalize(&n).unwrap() else {
            panic!("expected a place");
        };
        assert_eq!(place.population, None);
        assert_eq!(place.tier, Tier::Village);
    }

    #[test]
    fn test_missing_geometry_is_tile_error() {
        let (registry, extent, countries) = (registry(), extent(), CountryTable::default());
        let normalizer = FeatureNormalizer::new(&registry, &extent, &countries);
        let mut n = node(10, 1.0, 47.0, &[("name", "Ghost"), ("place", "town")]);
        n.geometry = None;

        let err = normalizer.normalize(&n).unwrap_err();
        assert!(matches!(err, TileError::MissingGeometry { node_id: 10 }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unresolvable_region_is_fatal() {
        let (registry, extent, countries) = (registry(), extent(), CountryTable::default());
        let normalizer = FeatureNormalizer::new(&registry, &extent, &countries);
        let n = node(
            11,
            1.0,
            47.0,
            &[("name", "Lost"), ("place", "town"), ("region", r#"{"2":999;"6":998}"#)],
        );

        let err = normalizer.normalize(&n).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("Lost"));
    }

    #[test]
    fn test_stats_accounting() {
        let mut stats = RunStats::default();
        stats.record(&Normalized::Discarded(Discard::Unnamed));
        stats.record(&Normalized::Discarded(Discard::OutsideExtent));
        assert_eq!(stats.input, 2);
        assert_eq!(stats.unnamed, 1);
        assert_eq!(stats.outside, 1);
        assert_eq!(stats.valid, 0);
    }
}
