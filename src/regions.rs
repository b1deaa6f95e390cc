//! Registry of administrative regions discovered during the crawl.

use hashbrown::HashMap;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::models::{AdminLevel, Region};
use crate::overpass::AreaElement;

/// Chain of enclosing region IDs keyed by admin level
pub type Membership = BTreeMap<AdminLevel, i64>;

/// Decode a node's `region` tag, e.g. `{"2":1;"6":4}`.
pub fn parse_membership(raw: &str) -> Option<Membership> {
    let decoded: BTreeMap<String, i64> = serde_json::from_str(&raw.replace(';', ",")).ok()?;
    decoded
        .into_iter()
        .map(|(level, id)| level.trim().parse::<u8>().ok().map(|l| (AdminLevel(l), id)))
        .collect()
}

/// Build a region from an area element. Areas without a name or a numeric
/// admin level are unusable.
pub fn region_from_area(area: &AreaElement) -> Option<Region> {
    let name = area.tag("name").filter(|n| !n.is_empty())?;
    let level = area.tag("admin_level")?.trim().parse::<u8>().ok()?;

    let mut region = Region::new(area.id, name, AdminLevel(level));
    region.prefix = area.tag("name:prefix").map(str::to_string);
    region.suffix = area.tag("name:suffix").map(str::to_string);
    region.reference = area.tag("ref:INSEE").map(str::to_string);
    if region.level.is_country() {
        region.country_code = area
            .tag("ISO3166-1")
            .filter(|c| !c.is_empty())
            .map(str::to_string);
    }
    Some(region)
}

/// Regions keyed by ID. Grows for the lifetime of a run; the first
/// observation of an ID wins.
#[derive(Debug, Default)]
pub struct RegionRegistry {
    regions: HashMap<i64, Region>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a region unless its ID is already known. Returns whether it was new.
    pub fn register(&mut self, region: Region) -> bool {
        if self.regions.contains_key(&region.id) {
            return false;
        }
        info!("New region {}, level {}", region.name, region.level);
        self.regions.insert(region.id, region);
        true
    }

    pub fn register_area(&mut self, area: &AreaElement) -> bool {
        if self.regions.contains_key(&area.id) {
            return false;
        }
        match region_from_area(area) {
            Some(region) => self.register(region),
            None => {
                warn!("Ignoring area {} without name or admin level", area.id);
                false
            }
        }
    }

    pub fn get(&self, id: i64) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// Country-level region of a membership chain
    pub fn country_of(&self, membership: &Membership) -> Option<&Region> {
        membership
            .get(&AdminLevel::COUNTRY)
            .and_then(|id| self.get(*id))
    }

    /// Walk the chain from `preferred` up to the country level and return
    /// the first registered region.
    pub fn resolve(&self, membership: &Membership, preferred: AdminLevel) -> Option<&Region> {
        preferred
            .up_to_country()
            .filter_map(|level| membership.get(&level))
            .find_map(|id| self.get(*id))
    }

    /// All country-level regions, sorted by ID
    pub fn countries(&self) -> Vec<&Region> {
        let mut countries: Vec<&Region> = self
            .regions
            .values()
            .filter(|r| r.level.is_country())
            .collect();
        countries.sort_by_key(|r| r.id);
        countries
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
