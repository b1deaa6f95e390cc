//! Overpass API access: query templates, HTTP client and response schema.

mod client;
mod query;
mod response;

pub use client::{GeodataSource, OverpassClient, DEFAULT_ENDPOINT};
pub use query::QueryTemplate;
pub use response::{AreaElement, Element, NodeElement, OverpassResponse};
