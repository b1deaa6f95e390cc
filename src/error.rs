//! Error taxonomy for tile processing.

use thiserror::Error;

use crate::models::AdminLevel;

/// Region resolution failures. These mean the registry is structurally
/// incomplete and the run must stop.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error(
        "no enclosing region for `{name}` (node {node_id}) between admin level {preferred} and the country level"
    )]
    NoEnclosingRegion {
        node_id: i64,
        name: String,
        preferred: AdminLevel,
    },
}

/// Failure while ingesting one tile's payload.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("node {node_id} has no geometry")]
    MissingGeometry { node_id: i64 },

    #[error("node {node_id} has a malformed region membership `{raw}`")]
    MalformedMembership { node_id: i64, raw: String },

    #[error(transparent)]
    Region(#[from] RegionError),
}

impl TileError {
    /// Fatal errors abort the whole run; others only discard the tile.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TileError::Region(_))
    }
}
