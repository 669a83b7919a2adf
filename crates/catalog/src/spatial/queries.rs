//! Spatial query utilities for distance calculations.
//!
//! Uses the Haversine formula for accurate distances on Earth's surface.

use geo::{Distance, Haversine, Point};

/// Meters per degree of latitude (and of longitude at the equator)
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    Haversine.distance(p1, p2)
}

/// Convert meters to degrees at equator (for bounding box queries)
pub fn meters_to_degrees_approx(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Degree-space search radius that covers `meters` in every direction around
/// `latitude`. Longitude degrees shrink toward the poles, so the radius grows.
pub fn search_radius_degrees(meters: f64, latitude: f64) -> f64 {
    let shrink = latitude.to_radians().cos().abs().max(0.01);
    meters_to_degrees_approx(meters) / shrink
}
