//! In-memory catalog backed by GeoJSON bundles.
//!
//! Stores all panoramas and stations in memory with spatial indices for
//! fast radius queries.

use std::sync::Arc;

use geo::Point;
use rstar::RTree;

use crate::models::{traits::*, types::*};
use crate::spatial::index::PointNode;
use crate::spatial::queries::{haversine_distance, search_radius_degrees};

// ============================================================================
// Static Catalog
// ============================================================================

/// In-memory catalog with spatial indexing
///
/// This type is cheap to clone since all data is stored in `Arc`s.
#[derive(Clone)]
pub struct StaticPanoramaCatalog {
    inner: Arc<CatalogData>,
}

struct CatalogData {
    // Core data
    panoramas: Vec<Panorama>,
    stations: Vec<Station>,

    // Spatial indices
    panorama_tree: RTree<PointNode>,
    station_tree: RTree<PointNode>,
}

impl StaticPanoramaCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::from_data(Vec::new(), Vec::new())
    }

    /// Build catalog from raw data (used by the GeoJSON loader)
    pub fn from_data(panoramas: Vec<Panorama>, stations: Vec<Station>) -> Self {
        let panorama_tree = RTree::bulk_load(
            panoramas
                .iter()
                .enumerate()
                .map(|(i, p)| PointNode::new(p.location, i))
                .collect(),
        );

        let station_tree = RTree::bulk_load(
            stations
                .iter()
                .enumerate()
                .map(|(i, s)| PointNode::new(s.location, i))
                .collect(),
        );

        tracing::debug!(
            panoramas = panoramas.len(),
            stations = stations.len(),
            "built panorama catalog"
        );

        Self {
            inner: Arc::new(CatalogData {
                panoramas,
                stations,
                panorama_tree,
                station_tree,
            }),
        }
    }

    /// Indices of nodes within `radius_m` of `point`, paired with their
    /// haversine distance and sorted nearest first.
    fn within(
        tree: &RTree<PointNode>,
        locations: impl Fn(usize) -> Point,
        point: Point,
        radius_m: f64,
    ) -> Vec<(usize, f64)> {
        // Validate radius is positive
        if radius_m <= 0.0 || !radius_m.is_finite() {
            return Vec::new();
        }

        let radius_deg = search_radius_degrees(radius_m, point.y());

        let mut hits: Vec<(usize, f64)> = tree
            .locate_within_distance([point.x(), point.y()], radius_deg * radius_deg)
            .map(|node| (node.index, haversine_distance(point, locations(node.index))))
            .filter(|(_, distance)| *distance <= radius_m)
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }
}

impl Default for StaticPanoramaCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PanoramaCatalog for StaticPanoramaCatalog {
    fn all_panoramas(&self) -> &[Panorama] {
        &self.inner.panoramas
    }

    fn all_stations(&self) -> &[Station] {
        &self.inner.stations
    }

    fn nearest_panorama(&self, point: Point, radius_m: f64) -> Option<&Panorama> {
        let panoramas = &self.inner.panoramas;

        Self::within(
            &self.inner.panorama_tree,
            |i| panoramas[i].location,
            point,
            radius_m,
        )
        .first()
        .map(|&(i, _)| &panoramas[i])
    }

    fn stations_near(&self, point: Point, radius_m: f64) -> Vec<&Station> {
        let stations = &self.inner.stations;

        Self::within(
            &self.inner.station_tree,
            |i| stations[i].location,
            point,
            radius_m,
        )
        .into_iter()
        .map(|(i, _)| &stations[i])
        .collect()
    }
}
