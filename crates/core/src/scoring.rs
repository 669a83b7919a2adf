//! Distance scoring.
//!
//! Pure functions only. The score of a round is the great-circle distance
//! between the panorama and the guess; lower is better.

use geo::{Distance, Haversine};
use serde::{Deserialize, Serialize};

use crate::location::Coordinate;

/// Mean earth radius used by [`Haversine`], in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Largest possible great-circle distance (antipodal points).
pub const MAX_DISTANCE_METERS: f64 = std::f64::consts::PI * EARTH_RADIUS_METERS;

/// Great-circle distance in meters.
pub fn score(actual: Coordinate, guess: Coordinate) -> f64 {
    Haversine.distance(geo::Point::from(actual), geo::Point::from(guess))
}

/// Size of the distance label, saturating at one kilometer. Cosmetic only.
pub fn marker_scale(distance_meters: f64) -> f64 {
    if distance_meters.is_nan() {
        return 1.0;
    }

    (distance_meters / 1000.0).clamp(0.0, 1.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Guess {
    Placed(Coordinate),
    /// Time ran out before any pin was placed
    Missing,
}

impl Guess {
    pub fn location(&self) -> Option<Coordinate> {
        match self {
            Guess::Placed(c) => Some(*c),
            Guess::Missing => None,
        }
    }
}

impl From<Option<Coordinate>> for Guess {
    fn from(value: Option<Coordinate>) -> Self {
        value.map_or(Guess::Missing, Guess::Placed)
    }
}

/// Outcome of a finished round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuessResult {
    pub actual: Coordinate,
    pub guess: Guess,
    pub distance_meters: f64,
}

impl GuessResult {
    pub fn new(actual: Coordinate, guess: Guess) -> Self {
        let distance_meters = match guess {
            Guess::Placed(guess) => score(actual, guess),
            Guess::Missing => MAX_DISTANCE_METERS,
        };

        Self {
            actual,
            guess,
            distance_meters,
        }
    }

    pub fn marker_scale(&self) -> f64 {
        marker_scale(self.distance_meters)
    }

    /// Text shown on the distance label
    pub fn label(&self) -> String {
        format!("Distance: {}m", self.distance_meters.floor())
    }

    /// Hover text for the distance label
    pub fn title(&self) -> String {
        format!("Distance: {:.2}m", self.distance_meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(score(c(35.0, 139.0), c(35.0, 139.0)), 0.0);

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            let a = c(rng.random_range(-90.0..=90.0), rng.random_range(-180.0..=180.0));
            assert_eq!(score(a, a), 0.0);
        }
    }

    #[test]
    fn test_one_degree_of_latitude() {
        assert_relative_eq!(score(c(35.0, 139.0), c(36.0, 139.0)), 111_195.0, epsilon = 1.0);
    }

    #[test]
    fn test_symmetric() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1_000 {
            let a = c(rng.random_range(-90.0..=90.0), rng.random_range(-180.0..=180.0));
            let b = c(rng.random_range(-90.0..=90.0), rng.random_range(-180.0..=180.0));

            assert_relative_eq!(score(a, b), score(b, a), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_antipodes_reach_max_distance() {
        let d = score(c(0.0, 0.0), c(0.0, 180.0));
        assert_relative_eq!(d, MAX_DISTANCE_METERS, max_relative = 1e-6);
    }

    #[test]
    fn test_marker_scale_clamps() {
        assert_eq!(marker_scale(0.0), 0.0);
        assert_eq!(marker_scale(250.0), 0.25);
        assert_eq!(marker_scale(1_000.0), 1.0);
        assert_eq!(marker_scale(25_000.0), 1.0);
        assert_eq!(marker_scale(-5.0), 0.0);
    }

    #[test]
    fn test_missing_guess_scores_max() {
        let result = GuessResult::new(c(35.0, 139.0), Guess::Missing);

        assert_eq!(result.distance_meters, MAX_DISTANCE_METERS);
        assert_eq!(result.marker_scale(), 1.0);
        assert_eq!(result.guess.location(), None);
    }

    #[test]
    fn test_labels() {
        let result = GuessResult {
            actual: c(35.0, 139.0),
            guess: Guess::Placed(c(35.0, 139.0)),
            distance_meters: 1234.5678,
        };

        assert_eq!(result.label(), "Distance: 1234m");
        assert_eq!(result.title(), "Distance: 1234.57m");
    }
}
