//! Normalized place records produced from raw nodes.

use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Importance/zoom class of a place marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tier {
    /// City-equivalent (tier 0)
    City,
    /// Town-equivalent (tier 1)
    Town,
    /// Village or hamlet (tier 2)
    Village,
}

impl Tier {
    pub const COUNT: usize = 3;

    /// Map an OSM `place=*` value to a tier
    pub fn from_place_kind(kind: &str) -> Option<Self> {
        match kind {
            "city" => Some(Tier::City),
            "town" => Some(Tier::Town),
            "village" | "hamlet" => Some(Tier::Village),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tier::City => 0,
            Tier::Town => 1,
            Tier::Village => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Tier::City),
            1 => Some(Tier::Town),
            2 => Some(Tier::Village),
            _ => None,
        }
    }

    /// All tiers, coarsest first
    pub fn all() -> &'static [Tier] {
        &[Tier::City, Tier::Town, Tier::Village]
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        tier.index() as u8
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Tier::from_index(value as usize).ok_or_else(|| format!("invalid tier {}", value))
    }
}

/// A named inhabited place ready for deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    /// Source node ID, used as the final ordering tie-break
    pub osm_id: i64,

    pub name: String,

    /// ISO 3166-1 code of the enclosing country, if the country carries one
    pub country: Option<String>,

    /// Display name of the resolved region
    pub region: String,

    pub tier: Tier,

    pub population: Option<u64>,

    /// Location (x = lon, y = lat)
    pub point: Point<f64>,
}

impl PlaceRecord {
    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }
}
