//! Greedy tier placement over per-tier occupancy indices.

use std::cmp::Ordering;
use tracing::debug;

use super::{OccupancyIndex, RTreeOccupancy};
use crate::models::{PlaceRecord, Tier};

/// Minimum separation per tier in degrees, coarsest first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation(pub [f64; Tier::COUNT]);

impl Default for Separation {
    fn default() -> Self {
        Self([0.25, 0.05, 0.01])
    }
}

impl Separation {
    pub fn radius(&self, tier: Tier) -> f64 {
        self.0[tier.index()]
    }
}

/// Processing order: population descending, records without a population
/// after all others, then node ID.
pub fn compare_population(a: &PlaceRecord, b: &PlaceRecord) -> Ordering {
    let by_population = match (a.population, b.population) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_population.then_with(|| a.osm_id.cmp(&b.osm_id))
}

/// Incremental tier placement. Feed records in processing order.
pub struct Deduplicator<I: OccupancyIndex = RTreeOccupancy> {
    separation: Separation,
    indices: Vec<I>,
    accepted: Vec<Vec<PlaceRecord>>,
    suppressed: usize,
}

impl<I: OccupancyIndex> Deduplicator<I> {
    pub fn new(separation: Separation) -> Self {
        Self {
            separation,
            indices: (0..Tier::COUNT).map(|_| I::default()).collect(),
            accepted: vec![Vec::new(); Tier::COUNT],
            suppressed: 0,
        }
    }

    /// Place one record and return the tier it is displayed at, if any.
    ///
    /// Tiers are scanned from the coarsest down to the record's own. The
    /// first free tier accepts the record. Every scanned tier receives an
    /// entry, so a record suppressed at a tier still blocks weaker
    /// neighbours there.
    pub fn place(&mut self, mut record: PlaceRecord) -> Option<Tier> {
        let point = [record.lon(), record.lat()];
        let mut displayed = None;

        for tier in &Tier::all()[..=record.tier.index()] {
            let index = &mut self.indices[tier.index()];
            let occupied = index.query_nearby(point, self.separation.radius(*tier));
            index.insert(point);
            if !occupied && displayed.is_none() {
                displayed = Some(*tier);
            }
        }

        match displayed {
            Some(tier) => {
                record.tier = tier;
                self.accepted[tier.index()].push(record);
            }
            None => {
                debug!("Suppressed {} ({})", record.name, record.region);
                self.suppressed += 1;
            }
        }
        displayed
    }

    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    /// Accepted records, tier 0 first, each tier in placement order
    pub fn finish(self) -> Vec<PlaceRecord> {
        self.accepted.into_iter().flatten().collect()
    }
}

/// Sort and place every record; returns the visible records tagged with
/// their displayed tier.
pub fn deduplicate(mut records: Vec<PlaceRecord>, separation: Separation) -> Vec<PlaceRecord> {
    records.sort_by(compare_population);

    let mut dedup: Deduplicator = Deduplicator::new(separation);
    for record in records {
        dedup.place(record);
    }
    debug!("{} records suppressed", dedup.suppressed());
    dedup.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;
    use std::collections::HashMap;

    fn record(id: i64, lon: f64, lat: f64, tier: Tier, population: Option<u64>) -> PlaceRecord {
        PlaceRecord {
            osm_id: id,
            name: format!("place-{}", id),
            country: Some("FR".into()),
            region: "Region".into(),
            tier,
            population,
            point: Point::new(lon, lat),
        }
    }

    fn distance(a: &PlaceRecord, b: &PlaceRecord) -> f64 {
        (a.lon() - b.lon()).hypot(a.lat() - b.lat())
    }

    /// Deterministic pseudo-random records in the unit square
    fn scattered(count: usize) -> Vec<PlaceRecord> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as f64 / (1u64 << 31) as f64
        };

        (0..count)
            .map(|i| {
                let lon = next();
                let lat = next();
                let tier = Tier::from_index((next() * 3.0) as usize % 3).unwrap();
                let population = if next() < 0.3 {
                    None
                } else {
                    Some((next() * 100_000.0) as u64)
                };
                record(i as i64, lon, lat, tier, population)
            })
            .collect()
    }

    #[test]
    fn test_sort_population_descending_absent_last() {
        let mut records = vec![
            record(1, 0.0, 0.0, Tier::Village, None),
            record(2, 0.0, 0.0, Tier::Village, Some(10)),
            record(3, 0.0, 0.0, Tier::City, Some(500_000)),
            record(4, 0.0, 0.0, Tier::Town, Some(0)),
            record(5, 0.0, 0.0, Tier::City, None),
        ];
        records.sort_by(compare_population);

        let ids: Vec<i64> = records.iter().map(|r| r.osm_id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1, 5]);
    }

    #[test]
    fn test_equal_population_tie_break_by_id() {
        let a = record(9, 0.0, 0.0, Tier::Town, Some(100));
        let b = record(2, 0.0, 0.0, Tier::Town, Some(100));
        assert_eq!(compare_population(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_neighbour_falls_to_finer_tier() {
        let out = deduplicate(
            vec![
                record(1, 0.0, 0.0, Tier::City, Some(100_000)),
                record(2, 0.1, 0.0, Tier::Town, Some(5_000)),
            ],
            Separation::default(),
        );

        let tiers: HashMap<i64, Tier> = out.iter().map(|r| (r.osm_id, r.tier)).collect();
        assert_eq!(tiers[&1], Tier::City);
        assert_eq!(tiers[&2], Tier::Town);
    }

    #[test]
    fn test_isolated_town_is_promoted() {
        let out = deduplicate(
            vec![
                record(1, 0.0, 0.0, Tier::City, Some(100_000)),
                record(2, 1.0, 1.0, Tier::Town, Some(800)),
            ],
            Separation::default(),
        );
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.tier == Tier::City));
    }

    #[test]
    fn test_placeholder_blocks_weaker_same_tier_neighbour() {
        let out = deduplicate(
            vec![
                // Promoted to tier 0, placeholder at tier 1
                record(1, 1.0, 1.0, Tier::Town, Some(8_000)),
                // Blocked at 0 and 1, visible at 2
                record(2, 1.02, 1.0, Tier::Village, Some(100)),
                // Blocked at 0 and by the placeholder at 1
                record(3, 1.03, 1.0, Tier::Town, Some(50)),
            ],
            Separation::default(),
        );

        let tiers: HashMap<i64, Tier> = out.iter().map(|r| (r.osm_id, r.tier)).collect();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[&1], Tier::City);
        assert_eq!(tiers[&2], Tier::Village);
        assert!(!tiers.contains_key(&3));
    }

    #[test]
    fn test_suppressed_record_still_blocks_chained_neighbour() {
        // Each village sits 0.009 from the previous one, inside the tier 2
        // radius; the last is 0.018 from the first, outside it.
        let mut dedup: Deduplicator = Deduplicator::new(Separation::default());
        assert_eq!(dedup.place(record(1, 0.0, 0.0, Tier::Village, Some(3))), Some(Tier::City));
        assert_eq!(dedup.place(record(2, 0.009, 0.0, Tier::Village, Some(2))), None);
        assert_eq!(dedup.place(record(3, 0.018, 0.0, Tier::Village, Some(1))), None);
        assert_eq!(dedup.suppressed(), 2);

        let out = dedup.finish();
        assert_eq!(out.len(), 1);
        assert_eq!((out[0].osm_id, out[0].tier), (1, Tier::City));
    }

    #[test]
    fn test_chain_deduplicated_in_population_order() {
        let out = deduplicate(
            vec![
                record(3, 0.018, 0.0, Tier::Village, Some(1)),
                record(1, 0.0, 0.0, Tier::Village, Some(3)),
                record(2, 0.009, 0.0, Tier::Village, Some(2)),
            ],
            Separation::default(),
        );
        let ids: Vec<i64> = out.iter().map(|r| r.osm_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_identical_coordinates_resolved_by_population() {
        let out = deduplicate(
            vec![
                record(1, 3.0, 3.0, Tier::City, Some(10)),
                record(2, 3.0, 3.0, Tier::City, Some(20)),
                record(3, 3.0, 3.0, Tier::City, None),
            ],
            Separation::default(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].osm_id, 2);
    }

    #[test]
    fn test_boundary_distance_is_occupied() {
        let separation = Separation([0.5, 0.25, 0.125]);
        let out = deduplicate(
            vec![
                record(1, 0.0, 0.0, Tier::City, Some(2)),
                record(2, 0.5, 0.0, Tier::City, Some(1)),
            ],
            separation,
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_emission_is_grouped_by_tier() {
        let out = deduplicate(scattered(300), Separation::default());
        let tiers: Vec<Tier> = out.iter().map(|r| r.tier).collect();
        let mut sorted = tiers.clone();
        sorted.sort();
        assert_eq!(tiers, sorted);
    }

    #[test]
    fn test_same_tier_separation_holds() {
        let separation = Separation::default();
        let out = deduplicate(scattered(500), separation);
        assert!(!out.is_empty());

        for (i, a) in out.iter().enumerate() {
            for b in &out[i + 1..] {
                if a.tier == b.tier {
                    assert!(
                        distance(a, b) >= separation.radius(a.tier),
                        "{} and {} too close at {:?}",
                        a.osm_id,
                        b.osm_id,
                        a.tier
                    );
                }
            }
        }
    }

    #[test]
    fn test_never_demoted() {
        let input = scattered(500);
        let semantic: HashMap<i64, Tier> = input.iter().map(|r| (r.osm_id, r.tier)).collect();

        for r in deduplicate(input, Separation::default()) {
            assert!(r.tier <= semantic[&r.osm_id]);
        }
    }

    #[test]
    fn test_deterministic_regardless_of_input_order() {
        let input = scattered(200);
        let mut reversed = input.clone();
        reversed.reverse();

        let a = deduplicate(input, Separation::default());
        let b = deduplicate(reversed, Separation::default());
        assert_eq!(a, b);
    }
}
