//! Core trait for catalog queries.
//!
//! Implementations can be in-memory, database-backed, or remote.

use geo::Point;

use crate::models::types::*;

/// Provider of panorama and station data with spatial queries.
///
/// All radii are in meters and measured along the earth's surface.
pub trait PanoramaCatalog: Send + Sync {
    // ---- Collections ----
    fn all_panoramas(&self) -> &[Panorama];
    fn all_stations(&self) -> &[Station];

    // ---- Spatial queries ----

    /// The closest panorama within `radius_m` of `point`, if any
    fn nearest_panorama(&self, point: Point, radius_m: f64) -> Option<&Panorama>;

    /// Stations within `radius_m` of `point`, nearest first
    fn stations_near(&self, point: Point, radius_m: f64) -> Vec<&Station>;
}
