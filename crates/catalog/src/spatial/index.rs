//! R-tree nodes for spatial indexing.
//!
//! Wraps catalog entries with geometric data for efficient spatial queries.
//!
//! ## Two-Stage Filtering
//!
//! The spatial queries use a two-stage filtering approach:
//! 1. **R-tree filter**: Euclidean distance in degree space, with the search
//!    radius widened by the longitude shrink factor at the query latitude
//! 2. **Haversine filter**: accurate geodesic distance on the candidates
//!
//! Nodes store an index into the owning collection rather than a copy of the
//! entry, so the tree stays small and lookups return borrowed entries.

use geo::Point;
use rstar::{PointDistance, RTreeObject, AABB};

// ============================================================================
// Point Spatial Node
// ============================================================================

#[derive(Clone, Copy, Debug)]
pub struct PointNode {
    pub index: usize,
    point: [f64; 2],
}

impl PointNode {
    pub fn new(location: Point, index: usize) -> Self {
        Self {
            index,
            point: [location.x(), location.y()],
        }
    }
}

impl RTreeObject for PointNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for PointNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}
