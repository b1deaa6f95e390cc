//! Multi-tier spatial deduplication of place records.
//!
//! Each tier has a minimum on-map separation. Records are processed by
//! decreasing population and placed at the coarsest tier (up to their own)
//! where no earlier record occupies the neighbourhood.

mod engine;
mod index;

pub use engine::{compare_population, deduplicate, Deduplicator, Separation};
pub use index::{OccupancyIndex, RTreeOccupancy};
