//! Per-tile cache of raw geodata responses on disk.
//!
//! The directory is append-only across runs: existing entries are never
//! overwritten, only deleted when found corrupt.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::TileCoord;

pub struct TileCache {
    dir: PathBuf,
}

impl TileCache {
    /// Open (and create if needed) a cache directory
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, tile: TileCoord) -> PathBuf {
        self.dir.join(format!("{}_{}.geojson", tile.x, tile.y))
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        self.path(tile).is_file()
    }

    /// Read a cached payload; `None` when the tile was never fetched
    pub fn read(&self, tile: TileCoord) -> Result<Option<String>> {
        let path = self.path(tile);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Persist a fresh payload. Returns `false` if an entry already existed.
    pub fn write(&self, tile: TileCoord, raw: &str) -> Result<bool> {
        let path = self.path(tile);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("{} already cached, keeping existing entry", tile);
                return Ok(false);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()))
            }
        };

        if let Err(e) = file.write_all(raw.as_bytes()).and_then(|_| file.sync_all()) {
            // Never leave a truncated entry behind
            let _ = fs::remove_file(&path);
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }
        Ok(true)
    }

    /// Delete a corrupt entry
    pub fn remove(&self, tile: TileCoord) -> Result<()> {
        let path = self.path(tile);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}
