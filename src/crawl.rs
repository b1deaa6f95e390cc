//! Cache-aware tile crawl with bounded request concurrency.
//!
//! Tiles are visited in grid order. Cache hits are ingested inline; misses
//! are fetched by tasks gated on a semaphore, so at most `concurrency`
//! requests are in flight. Completed downloads are ingested by the crawl
//! loop itself, so sinks are never shared across tasks.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

use crate::cache::TileCache;
use crate::error::TileError;
use crate::models::TileCoord;
use crate::overpass::{GeodataSource, OverpassResponse};

/// Consumer of parsed tile payloads
pub trait TileSink {
    /// Ingest one tile. On error nothing from this tile's nodes may be kept.
    fn ingest(&mut self, tile: TileCoord, response: &OverpassResponse) -> Result<(), TileError>;
}

/// Per-run crawl counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Tiles served from the cache
    pub cached: usize,
    /// Tiles downloaded and ingested
    pub fetched: usize,
    /// Tiles whose request failed
    pub failed: usize,
    /// Tiles whose payload was unusable (cache entry deleted)
    pub corrupt: usize,
}

type Download = (TileCoord, Result<String>);

pub struct TileCrawler<S> {
    source: Arc<S>,
    cache: TileCache,
    limiter: Arc<Semaphore>,
    progress: ProgressBar,
}

impl<S: GeodataSource> TileCrawler<S> {
    pub fn new(source: S, cache: TileCache, concurrency: usize) -> Self {
        Self {
            source: Arc::new(source),
            cache,
            limiter: Arc::new(Semaphore::new(concurrency.max(1))),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Crawl `tiles`, feeding every usable payload to `sink`.
    ///
    /// Per-tile failures are logged and skipped; only fatal ingest errors
    /// and cache I/O failures abort the crawl.
    pub async fn crawl<K: TileSink>(&self, tiles: &[TileCoord], sink: &mut K) -> Result<CrawlStats> {
        let mut stats = CrawlStats::default();
        let mut downloads: JoinSet<Download> = JoinSet::new();
        self.progress.set_length(tiles.len() as u64);

        for &tile in tiles {
            while let Some(joined) = downloads.try_join_next() {
                self.on_download(joined, sink, &mut stats)?;
            }

            match self.cache.read(tile) {
                Ok(Some(raw)) => {
                    info!("{}: From cache {}", tile, self.cache.path(tile).display());
                    self.on_cached(tile, &raw, sink, &mut stats)?;
                    self.progress.inc(1);
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    // Unreadable entries (e.g. invalid UTF-8) count as corrupt
                    warn!("{}: {:#}, deleting", tile, e);
                    self.cache.remove(tile)?;
                    stats.corrupt += 1;
                    self.progress.inc(1);
                    continue;
                }
            }

            let permit = Arc::clone(&self.limiter)
                .acquire_owned()
                .await
                .context("Request limiter closed")?;
            info!("{}: Downloading", tile);
            let source = Arc::clone(&self.source);
            downloads.spawn(async move {
                let result = source.fetch(tile).await;
                drop(permit);
                (tile, result)
            });
        }

        while let Some(joined) = downloads.join_next().await {
            self.on_download(joined, sink, &mut stats)?;
        }
        self.progress.finish_and_clear();

        info!(
            "Crawl complete: {} cached, {} fetched, {} failed, {} corrupt",
            stats.cached, stats.fetched, stats.failed, stats.corrupt
        );
        Ok(stats)
    }

    fn on_cached<K: TileSink>(
        &self,
        tile: TileCoord,
        raw: &str,
        sink: &mut K,
        stats: &mut CrawlStats,
    ) -> Result<()> {
        let ingested = OverpassResponse::parse(raw)
            .map_err(TileError::from)
            .and_then(|response| sink.ingest(tile, &response));

        match ingested {
            Ok(()) => stats.cached += 1,
            Err(e) => self.discard(tile, e, stats)?,
        }
        Ok(())
    }

    fn on_download<K: TileSink>(
        &self,
        joined: Result<Download, JoinError>,
        sink: &mut K,
        stats: &mut CrawlStats,
    ) -> Result<()> {
        self.progress.inc(1);

        let (tile, raw) = match joined {
            Ok((tile, Ok(raw))) => (tile, raw),
            Ok((tile, Err(e))) => {
                warn!("{}: Download failed: {:#}", tile, e);
                stats.failed += 1;
                return Ok(());
            }
            Err(e) => {
                warn!("Download task failed: {}", e);
                stats.failed += 1;
                return Ok(());
            }
        };

        let response = match OverpassResponse::parse(&raw) {
            Ok(response) => response,
            Err(e) => {
                warn!("{}: Unusable response, not caching: {}", tile, e);
                stats.failed += 1;
                return Ok(());
            }
        };

        info!("{}: Saving {}", tile, self.cache.path(tile).display());
        self.cache.write(tile, &raw)?;

        match sink.ingest(tile, &response) {
            Ok(()) => stats.fetched += 1,
            Err(e) => self.discard(tile, e, stats)?,
        }
        Ok(())
    }

    /// Drop a tile whose payload could not be ingested
    fn discard(&self, tile: TileCoord, e: TileError, stats: &mut CrawlStats) -> Result<()> {
        if e.is_fatal() {
            error!("{}: {}", tile, e);
            return Err(anyhow::Error::new(e).context(format!("Fatal error in tile {}", tile)));
        }

        warn!(
            "{}: {}, deleting {}",
            tile,
            e,
            self.cache.path(tile).display()
        );
        self.cache.remove(tile)?;
        stats.corrupt += 1;
        Ok(())
    }
}
