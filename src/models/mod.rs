//! Core data models for the place crawl.

pub mod geojson;
pub mod place;
pub mod region;
pub mod tile;

pub use geojson::{Feature, FeatureCollection, PointGeometry};
pub use place::{PlaceRecord, Tier};
pub use region::{AdminLevel, Region};
pub use tile::{MapExtent, TileCoord};
