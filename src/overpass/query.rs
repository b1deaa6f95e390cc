//! Overpass QL templates for the two crawls.

use crate::models::TileCoord;

/// Places with their enclosing admin areas (levels 2-6). Each node is
/// converted to carry its geometry and a `region` tag mapping admin level
/// to area ID, e.g. `{"2":3602202162;"6":3600007395}`.
const INHABITED_QUERY: &str = r#"
[out:json][bbox];
(
  node[place="city"];
  node[place="town"];
  node[place="village"];
)->.p;
.p is_in;
area._[name][boundary="administrative"][admin_level~"^[2-6]$"];
out tags;
foreach.p {
  is_in->.a;
  area.a[name][boundary="administrative"][admin_level~"^[2-6]$"]->.a;
  convert node
	::=::,
	::id=id(),
	::geom=geom(),
	region="{"+a.set('"'+t["admin_level"]+'":'+id())+"}";
  out geom;
}
"#;

/// Which crawl a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTemplate {
    /// Cities, towns and villages with their admin hierarchy
    Inhabited,
    /// Named `natural=*` nodes
    Natural,
}

impl QueryTemplate {
    /// Query parameters for one tile
    pub fn params(&self, tile: TileCoord) -> Vec<(&'static str, String)> {
        let (min_x, min_y, max_x, max_y) = tile.bbox();
        match self {
            QueryTemplate::Inhabited => vec![
                ("bbox", format!("{},{},{},{}", min_x, min_y, max_x, max_y)),
                ("data", INHABITED_QUERY.to_string()),
            ],
            QueryTemplate::Natural => vec![(
                "data",
                format!(
                    "[out:json];node({},{},{},{})[natural][name];out;",
                    min_y, min_x, max_y, max_x
                ),
            )],
        }
    }
}
