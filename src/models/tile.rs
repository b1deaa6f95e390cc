//! Tile grid over the configured map extent.

use anyhow::{bail, Context, Result};
use geo_types::{coord, Point, Rect};
use std::fs;
use std::path::Path;

/// Integer grid coordinates of one crawl tile (x = longitude, y = latitude).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Bounding box covered by this tile: (min_x, min_y, max_x, max_y)
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        let (x, y) = (f64::from(self.x), f64::from(self.y));
        (x, y, x + 1.0, y + 1.0)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

/// Map extent in degrees, boundary inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapExtent {
    rect: Rect<f64>,
}

impl MapExtent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        let values = [min_x, min_y, max_x, max_y];
        if values.iter().any(|v| !v.is_finite()) {
            bail!("map extent {:?} contains non-finite values", values);
        }
        if min_x >= max_x || min_y >= max_y {
            bail!("map extent {:?} is empty", values);
        }
        Ok(Self {
            rect: Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y }),
        })
    }

    /// Load a `[min_x, min_y, max_x, max_y]` JSON array from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read map extent {}", path.display()))?;
        let [min_x, min_y, max_x, max_y]: [f64; 4] =
            serde_json::from_str(&content).context("Failed to parse map extent")?;
        Self::new(min_x, min_y, max_x, max_y)
    }

    pub fn min(&self) -> Point<f64> {
        self.rect.min().into()
    }

    pub fn max(&self) -> Point<f64> {
        self.rect.max().into()
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let (min, max) = (self.rect.min(), self.rect.max());
        lon >= min.x && lon <= max.x && lat >= min.y && lat <= max.y
    }

    fn tile_range(&self) -> ((i32, i32), (i32, i32)) {
        let (min, max) = (self.rect.min(), self.rect.max());
        (
            (min.x.floor() as i32, max.x.ceil() as i32),
            (min.y.floor() as i32, max.y.ceil() as i32),
        )
    }

    /// Number of tiles `tiles` yields, computed without overflow
    pub fn tile_count(&self) -> u64 {
        let ((x0, x1), (y0, y1)) = self.tile_range();
        let width = (i64::from(x1) - i64::from(x0)).max(0) as u64;
        let height = (i64::from(y1) - i64::from(y0)).max(0) as u64;
        width.saturating_mul(height)
    }

    /// Tiles covering the extent, x-major then y, each visited once.
    pub fn tiles(&self) -> Vec<TileCoord> {
        let ((x0, x1), (y0, y1)) = self.tile_range();

        let mut tiles = Vec::with_capacity(usize::try_from(self.tile_count()).unwrap_or(0));
        for x in x0..x1 {
            for y in y0..y1 {
                tiles.push(TileCoord::new(x, y));
            }
        }
        tiles
    }
}
