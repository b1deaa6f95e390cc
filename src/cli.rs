//! Command-line plumbing shared by the binaries.

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Settings;

/// Options common to every pipeline. Flags override the config file.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Overpass interpreter URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Maximum concurrent Overpass requests
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Tile cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Map extent JSON file `[min_x, min_y, max_x, max_y]`
    #[arg(long)]
    pub extent: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

impl CommonArgs {
    /// Load the settings file and apply command-line overrides
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load_or_default(self.config.as_deref())?;

        if let Some(endpoint) = &self.endpoint {
            settings.overpass.endpoint = endpoint.clone();
        }
        if let Some(concurrency) = self.concurrency {
            settings.overpass.concurrency = concurrency;
        }
        if let Some(dir) = &self.cache_dir {
            settings.paths.cache_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            settings.paths.output_dir = dir.clone();
        }
        if let Some(path) = &self.extent {
            settings.paths.extent_file = path.clone();
        }
        Ok(settings)
    }

    pub fn progress_bar(&self) -> Result<ProgressBar> {
        if self.quiet {
            return Ok(ProgressBar::hidden());
        }
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tiles ({eta})",
                )?
                .progress_chars("#>-"),
        );
        Ok(pb)
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the `info` default
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
