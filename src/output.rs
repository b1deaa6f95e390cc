//! Output artifacts: place layers and the country configuration stub.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{CountrySettings, CountryTable};
use crate::models::{Feature, FeatureCollection, PlaceRecord, PointGeometry, Tier};
use crate::regions::RegionRegistry;

/// Properties of a place marker, in the compact keys the map reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceProperties {
    /// Name
    pub n: String,
    /// Country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c: Option<String>,
    /// Region display name
    pub r: String,
    /// Displayed tier
    pub p: Tier,
}

/// Build the marker layer. Population is dropped here.
pub fn place_collection(records: Vec<PlaceRecord>) -> FeatureCollection<PlaceProperties> {
    let features = records
        .into_iter()
        .map(|record| {
            Feature::new(
                PointGeometry::from(record.point),
                PlaceProperties {
                    n: record.name,
                    c: record.country,
                    r: record.region,
                    p: record.tier,
                },
            )
        })
        .collect();
    FeatureCollection::new(features)
}

/// Per-country stub for every registered country, at default settings
pub fn country_stub(registry: &RegionRegistry) -> CountryTable {
    let mut table = CountryTable::default();
    for country in registry.countries() {
        match &country.country_code {
            Some(code) => table.insert(code.clone(), CountrySettings::default()),
            None => warn!("Country {} has no ISO 3166-1 code", country.name),
        }
    }
    table
}

/// Writes artifacts into one directory
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `<stem>.geojson` (pretty) and `<stem>.min.geojson` (minified)
    pub fn write_collection<P: Serialize>(
        &self,
        stem: &str,
        collection: &FeatureCollection<P>,
    ) -> Result<()> {
        self.write_json(&format!("{}.geojson", stem), collection, true)?;
        self.write_json(&format!("{}.min.geojson", stem), collection, false)?;
        info!(
            "Wrote {} features to {}/{}.geojson",
            collection.features.len(),
            self.dir.display(),
            stem
        );
        Ok(())
    }

    pub fn write_countries(&self, table: &CountryTable) -> Result<()> {
        self.write_json("countries.json", table, true)?;
        info!("Wrote {} countries to countries.json", table.len());
        Ok(())
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T, pretty: bool) -> Result<()> {
        let path = self.dir.join(name);
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        if pretty {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
