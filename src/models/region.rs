//! Administrative regions reported by the geodata service.

use serde::{Deserialize, Serialize};

/// OSM `admin_level` value. Smaller is higher in the hierarchy.
/// See: https://wiki.openstreetmap.org/wiki/Tag:boundary%3Dadministrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminLevel(pub u8);

impl AdminLevel {
    /// Country (admin_level=2)
    pub const COUNTRY: AdminLevel = AdminLevel(2);

    /// Level used for countries missing from the country table (admin_level=6)
    pub const DEFAULT_PREFERRED: AdminLevel = AdminLevel(6);

    pub fn is_country(&self) -> bool {
        *self == Self::COUNTRY
    }

    /// Levels from `self` up to the country level, most specific first.
    pub fn up_to_country(self) -> impl Iterator<Item = AdminLevel> {
        (Self::COUNTRY.0..=self.0.max(Self::COUNTRY.0))
            .rev()
            .map(AdminLevel)
    }
}

impl std::fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An administrative region, immutable once registered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Stable area identifier from the geodata service
    pub id: i64,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Official reference code (e.g. the INSEE department number)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    pub level: AdminLevel,

    /// ISO 3166-1 code, only present at country level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl Region {
    pub fn new(id: i64, name: impl Into<String>, level: AdminLevel) -> Self {
        Self {
            id,
            name: name.into(),
            prefix: None,
            suffix: None,
            reference: None,
            level,
            country_code: None,
        }
    }

    /// Name shown on the map: `[ref|prefix] name [suffix]`.
    ///
    /// A non-empty reference code replaces the generic prefix.
    pub fn display_name(&self) -> String {
        let lead = non_empty(&self.reference).or_else(|| non_empty(&self.prefix));

        let mut out = String::with_capacity(self.name.len() + 16);
        if let Some(lead) = lead {
            out.push_str(lead);
            out.push(' ');
        }
        out.push_str(&self.name);
        if let Some(suffix) = non_empty(&self.suffix) {
            out.push(' ');
            out.push_str(suffix);
        }
        out
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
