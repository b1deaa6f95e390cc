//! Overpass HTTP client.

use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::QueryTemplate;
use crate::models::TileCoord;

/// Public Overpass instance. Respect its usage policy.
pub const DEFAULT_ENDPOINT: &str = "https://lz4.overpass-api.de/api/interpreter";

/// Source of raw tile payloads
pub trait GeodataSource: Send + Sync + 'static {
    /// Fetch the verbatim response body for one tile
    fn fetch(&self, tile: TileCoord) -> impl Future<Output = Result<String>> + Send;
}

/// Overpass API client bound to one query template
pub struct OverpassClient {
    client: Client,
    endpoint: Url,
    template: QueryTemplate,
}

impl OverpassClient {
    pub fn new(
        endpoint: &str,
        template: QueryTemplate,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid Overpass endpoint {}", endpoint))?;
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            template,
        })
    }

    /// Request URL for a tile
    pub fn url(&self, tile: TileCoord) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(self.template.params(tile));
        url
    }
}

impl GeodataSource for OverpassClient {
    async fn fetch(&self, tile: TileCoord) -> Result<String> {
        let url = self.url(tile);
        debug!(%tile, "GET {}", self.endpoint);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Overpass request failed for tile {}", tile))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Overpass returned {} for tile {}: {}",
                status,
                tile,
                body.chars().take(200).collect::<String>()
            );
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read Overpass response for tile {}", tile))
    }
}
