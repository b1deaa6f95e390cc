//! Inhabited places pipeline.
//!
//! Crawls cities, towns and villages over the map extent, resolves their
//! regions, and writes the deduplicated marker layer plus a country stub.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use placemark::cli::{init_logging, CommonArgs};
use placemark::config::CountryTable;
use placemark::models::MapExtent;
use placemark::overpass::{OverpassClient, QueryTemplate};
use placemark::pipeline::{run_inhabited, PipelineOptions};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "inhabited")]
#[command(about = "Build the inhabited places marker layer from Overpass")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Country table JSON (country code → admin level and color)
    #[arg(long)]
    countries: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let args = Args::parse();
    let mut settings = args.common.settings()?;
    if let Some(path) = &args.countries {
        settings.paths.countries_file = path.clone();
    }

    let extent = MapExtent::load(&settings.paths.extent_file)?;
    let countries = CountryTable::load(&settings.paths.countries_file)?;
    info!("Placemark inhabited places");
    info!(
        "{} tiles, {} configured countries, cache {}",
        extent.tile_count(),
        countries.len(),
        settings.paths.cache_dir.display()
    );

    let client = OverpassClient::new(
        &settings.overpass.endpoint,
        QueryTemplate::Inhabited,
        settings.overpass.timeout(),
        &settings.overpass.user_agent,
    )?;

    let mut options = PipelineOptions::from_settings(&settings);
    options.progress = args.common.progress_bar()?;

    run_inhabited(client, extent, countries, options)
        .await
        .context("Inhabited places run aborted")?;
    Ok(())
}
