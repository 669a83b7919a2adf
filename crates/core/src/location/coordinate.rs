use std::fmt;

use serde::{Deserialize, Serialize};

use crate::location::LocationError;

/// A position in floating-point degrees.
///
/// Always within `lat ∈ [-90, 90]` and `lng ∈ [-180, 180]` when built through
/// [`Coordinate::new`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, LocationError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(LocationError::LatitudeOutOfRange(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(LocationError::LongitudeOutOfRange(lng));
        }

        Ok(Coordinate { lat, lng })
    }

    pub fn is_valid(&self) -> bool {
        Coordinate::new(self.lat, self.lng).is_ok()
    }

    /// Arithmetic mean of both components.
    ///
    /// Not the geodesic midpoint; this is where the distance label goes and
    /// where the map is centered on reveal.
    pub fn midpoint(&self, other: &Coordinate) -> Coordinate {
        Coordinate {
            lat: (self.lat + other.lat) / 2.0,
            lng: (self.lng + other.lng) / 2.0,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

impl From<Coordinate> for geo::Point {
    fn from(c: Coordinate) -> Self {
        geo::Point::new(c.lng, c.lat)
    }
}

impl From<geo::Point> for Coordinate {
    fn from(p: geo::Point) -> Self {
        Coordinate {
            lat: p.y(),
            lng: p.x(),
        }
    }
}
