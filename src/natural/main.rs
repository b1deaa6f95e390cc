//! Natural landmarks pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use placemark::cli::{init_logging, CommonArgs};
use placemark::models::MapExtent;
use placemark::overpass::{OverpassClient, QueryTemplate};
use placemark::pipeline::{run_natural, PipelineOptions};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "natural")]
#[command(about = "Collect named natural landmarks from Overpass")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let args = Args::parse();
    let settings = args.common.settings()?;
    let extent = MapExtent::load(&settings.paths.extent_file)?;
    info!("Placemark natural landmarks: {} tiles", extent.tile_count());

    let client = OverpassClient::new(
        &settings.overpass.endpoint,
        QueryTemplate::Natural,
        settings.overpass.timeout(),
        &settings.overpass.user_agent,
    )?;

    let mut options = PipelineOptions::from_settings(&settings);
    options.progress = args.common.progress_bar()?;

    run_natural(client, extent, options)
        .await
        .context("Natural landmarks run aborted")?;
    Ok(())
}
