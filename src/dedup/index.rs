//! Occupancy indices, one per tier.

use rstar::RTree;

/// Spatial set of occupied locations
pub trait OccupancyIndex: Default {
    /// Mark a location as occupied
    fn insert(&mut self, point: [f64; 2]);

    /// Whether any occupied location lies within `radius` of `point`
    /// (boundary inclusive)
    fn query_nearby(&self, point: [f64; 2], radius: f64) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// R-tree backed occupancy index
#[derive(Debug, Default)]
pub struct RTreeOccupancy {
    tree: RTree<[f64; 2]>,
}

impl OccupancyIndex for RTreeOccupancy {
    fn insert(&mut self, point: [f64; 2]) {
        self.tree.insert(point);
    }

    fn query_nearby(&self, point: [f64; 2], radius: f64) -> bool {
        self.tree
            .locate_within_distance(point, radius * radius)
            .next()
            .is_some()
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}
