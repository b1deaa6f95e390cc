//! Run contexts wiring crawl, normalization, deduplication and output.
//!
//! All state of a run lives in its context object and is dropped with it.

use anyhow::Result;
use indicatif::ProgressBar;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::cache::TileCache;
use crate::config::{CountryTable, Settings};
use crate::crawl::{CrawlStats, TileCrawler, TileSink};
use crate::dedup::{deduplicate, Separation};
use crate::error::TileError;
use crate::landmarks::NaturalCollector;
use crate::models::{FeatureCollection, MapExtent, PlaceRecord, TileCoord};
use crate::normalize::{FeatureNormalizer, Normalized, RunStats};
use crate::output::{country_stub, place_collection, OutputWriter, PlaceProperties};
use crate::overpass::{Element, GeodataSource, OverpassResponse};
use crate::regions::RegionRegistry;

/// Where and how a pipeline runs
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub separation: Separation,
    pub progress: ProgressBar,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cache_dir: settings.paths.cache_dir.clone(),
            output_dir: settings.paths.output_dir.clone(),
            concurrency: settings.overpass.concurrency,
            separation: Separation(settings.dedup.separation),
            progress: ProgressBar::hidden(),
        }
    }
}

/// State of one inhabited-places run
#[derive(Debug)]
pub struct InhabitedRun {
    extent: MapExtent,
    countries: CountryTable,
    registry: RegionRegistry,
    records: Vec<PlaceRecord>,
    stats: RunStats,
}

/// Artifacts of a finished inhabited-places run
#[derive(Debug)]
pub struct InhabitedOutput {
    pub places: FeatureCollection<PlaceProperties>,
    pub countries: CountryTable,
    pub stats: RunStats,
}

impl InhabitedRun {
    pub fn new(extent: MapExtent, countries: CountryTable) -> Self {
        Self {
            extent,
            countries,
            registry: RegionRegistry::new(),
            records: Vec::new(),
            stats: RunStats::default(),
        }
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn records(&self) -> &[PlaceRecord] {
        &self.records
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Deduplicate the collected records and assemble the artifacts
    pub fn finish(self, separation: Separation) -> InhabitedOutput {
        let countries = country_stub(&self.registry);
        let places = deduplicate(self.records, separation);

        let mut stats = self.stats;
        stats.output = places.len();

        InhabitedOutput {
            places: place_collection(places),
            countries,
            stats,
        }
    }
}

impl TileSink for InhabitedRun {
    fn ingest(&mut self, tile: TileCoord, response: &OverpassResponse) -> Result<(), TileError> {
        // Areas first: a tile's nodes resolve against the areas it reports
        for element in &response.elements {
            if let Element::Area(area) = element {
                self.registry.register_area(area);
            }
        }

        let normalizer = FeatureNormalizer::new(&self.registry, &self.extent, &self.countries);
        let mut staged = Vec::new();
        let mut stats = RunStats::default();

        for element in &response.elements {
            let Element::Node(node) = element else {
                continue;
            };
            match normalizer.normalize(node) {
                Ok(outcome) => {
                    stats.record(&outcome);
                    if let Normalized::Place(place) = outcome {
                        staged.push(place);
                    }
                }
                Err(e) => {
                    if matches!(e, TileError::MissingGeometry { .. }) {
                        self.stats.no_geometry += 1;
                    }
                    return Err(e);
                }
            }
        }

        debug!("{}: {} places", tile, staged.len());
        self.records.extend(staged);
        self.stats.merge(&stats);
        Ok(())
    }
}

/// Crawl, deduplicate and write the inhabited-places artifacts
pub async fn run_inhabited<S: GeodataSource>(
    source: S,
    extent: MapExtent,
    countries: CountryTable,
    options: PipelineOptions,
) -> Result<RunStats> {
    let crawler = TileCrawler::new(source, TileCache::open(&options.cache_dir)?, options.concurrency)
        .with_progress(options.progress.clone());
    let writer = OutputWriter::new(&options.output_dir)?;

    let mut run = InhabitedRun::new(extent, countries);
    let crawl_stats = crawler.crawl(&extent.tiles(), &mut run).await?;
    log_crawl(&crawl_stats, run.registry().len());

    let (min, max) = (extent.min(), extent.max());
    info!(
        "Map extent is {}:{} ({}:{})",
        min.x(),
        min.y(),
        max.x() - min.x(),
        max.y() - min.y()
    );

    let output = run.finish(options.separation);
    writer.write_collection("places", &output.places)?;
    writer.write_countries(&output.countries)?;

    output.stats.log_summary();
    Ok(output.stats)
}

/// Crawl and write the natural landmarks layer
pub async fn run_natural<S: GeodataSource>(
    source: S,
    extent: MapExtent,
    options: PipelineOptions,
) -> Result<RunStats> {
    let cache = TileCache::open(options.cache_dir.join("natural"))?;
    let crawler =
        TileCrawler::new(source, cache, options.concurrency).with_progress(options.progress.clone());
    let writer = OutputWriter::new(&options.output_dir)?;

    let mut collector = NaturalCollector::new(extent);
    let crawl_stats = crawler.crawl(&extent.tiles(), &mut collector).await?;
    log_crawl(&crawl_stats, 0);

    let (collection, stats) = collector.finish();
    writer.write_collection("natural_places", &collection)?;

    info!(
        "Input places: {}, Output places: {}, Outside extent: {}, Invalid name: {}",
        stats.input, stats.output, stats.outside, stats.unnamed
    );
    Ok(stats)
}

fn log_crawl(stats: &CrawlStats, regions: usize) {
    debug!(
        cached = stats.cached,
        fetched = stats.fetched,
        failed = stats.failed,
        corrupt = stats.corrupt,
        regions,
        "Crawl finished"
    );
}
