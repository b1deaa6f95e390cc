//! Placemark - curated place markers from Overpass
//!
//! Crawls a tiled extent through a per-tile cache, resolves each place's
//! administrative region and reduces the result to a multi-tier,
//! non-overlapping marker layer.

pub mod cache;
pub mod cli;
pub mod config;
pub mod crawl;
pub mod dedup;
pub mod error;
pub mod landmarks;
pub mod models;
pub mod normalize;
pub mod output;
pub mod overpass;
pub mod pipeline;
pub mod regions;

pub use error::{RegionError, TileError};
pub use models::{MapExtent, PlaceRecord, Region, TileCoord, Tier};
