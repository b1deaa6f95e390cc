//! Run settings and operator-maintained input files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::AdminLevel;
use crate::overpass::DEFAULT_ENDPOINT;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub overpass: OverpassSettings,
    pub paths: PathSettings,
    pub dedup: DedupSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OverpassSettings {
    pub endpoint: String,
    /// Maximum in-flight requests
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for OverpassSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            concurrency: 1,
            timeout_secs: 300,
            user_agent: "Placemark/0.1 (place marker crawler)".to_string(),
        }
    }
}

impl OverpassSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PathSettings {
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    pub countries_file: PathBuf,
    pub extent_file: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("output/cache"),
            output_dir: PathBuf::from("output/data"),
            countries_file: PathBuf::from("data/config-countries.json"),
            extent_file: PathBuf::from("data/config-extent-map.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DedupSettings {
    /// Minimum separation per tier in degrees, coarsest first
    pub separation: [f64; 3],
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            separation: [0.25, 0.05, 0.01],
        }
    }
}

impl Settings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let settings: Settings = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(settings)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Per-country display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySettings {
    /// Admin level whose regions label places in this country
    pub alvl: AdminLevel,
    pub color: String,
}

impl Default for CountrySettings {
    fn default() -> Self {
        Self {
            alvl: AdminLevel::DEFAULT_PREFERRED,
            color: "#000000".to_string(),
        }
    }
}

/// Country code → settings, as maintained by the operator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryTable {
    countries: BTreeMap<String, CountrySettings>,
}

impl CountryTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read country table {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse country table")
    }

    /// Table with every given country at default settings
    pub fn with_defaults<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            countries: codes
                .into_iter()
                .map(|c| (c.into(), CountrySettings::default()))
                .collect(),
        }
    }

    pub fn insert(&mut self, code: impl Into<String>, settings: CountrySettings) {
        self.countries.insert(code.into(), settings);
    }

    pub fn get(&self, code: &str) -> Option<&CountrySettings> {
        self.countries.get(code)
    }

    /// Preferred admin level for a country, level 6 when unconfigured
    pub fn preferred_level(&self, code: Option<&str>) -> AdminLevel {
        code.and_then(|c| self.get(c))
            .map(|s| s.alvl)
            .unwrap_or(AdminLevel::DEFAULT_PREFERRED)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: Settings = toml::from_str(
            r#"
            [overpass]
            concurrency = 4

            [paths]
            cache_dir = "/tmp/tiles"
            "#,
        )
        .unwrap();

        assert_eq!(settings.overpass.concurrency, 4);
        assert_eq!(settings.overpass.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.paths.cache_dir, PathBuf::from("/tmp/tiles"));
        assert_eq!(settings.paths.output_dir, PathBuf::from("output/data"));
        assert_eq!(settings.dedup.separation, [0.25, 0.05, 0.01]);
    }

    #[test]
    fn test_country_table_parse() {
        let table: CountryTable = serde_json::from_str(
            r##"{"FR": {"alvl": 6, "color": "#0000ff"}, "CH": {"alvl": 4, "color": "#ff0000"}}"##,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.preferred_level(Some("CH")), AdminLevel(4));
        assert_eq!(table.preferred_level(Some("IT")), AdminLevel(6));
        assert_eq!(table.preferred_level(None), AdminLevel(6));
    }

    #[test]
    fn test_country_table_serializes_sorted() {
        let table = CountryTable::with_defaults(["IT", "AT"]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r##"{"AT":{"alvl":6,"color":"#000000"},"IT":{"alvl":6,"color":"#000000"}}"##
        );
    }
}
