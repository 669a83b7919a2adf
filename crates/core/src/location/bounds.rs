use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::location::{Coordinate, LocationError};

/// The fixed region locations are drawn from.
///
/// Invariant: `north > south` and `east > west`. Boxes crossing the
/// antimeridian are not supported.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundingBox")]
pub struct BoundingBox {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

#[derive(Deserialize)]
struct RawBoundingBox {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = LocationError;

    fn try_from(raw: RawBoundingBox) -> Result<Self, Self::Error> {
        BoundingBox::new(raw.north, raw.south, raw.east, raw.west)
    }
}

impl BoundingBox {
    /// Central Tokyo, from Akabane down to Haneda.
    pub const TOKYO: BoundingBox = BoundingBox {
        north: 35.779186,
        south: 35.588648,
        east: 139.829753,
        west: 139.612872,
    };

    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, LocationError> {
        // Range-check the corners
        Coordinate::new(north, east)?;
        Coordinate::new(south, west)?;

        if north <= south || east <= west {
            return Err(LocationError::EmptyBoundingBox {
                north,
                south,
                east,
                west,
            });
        }

        Ok(BoundingBox {
            north,
            south,
            east,
            west,
        })
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.south..=self.north).contains(&c.lat) && (self.west..=self.east).contains(&c.lng)
    }

    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: (self.north + self.south) / 2.0,
            lng: (self.east + self.west) / 2.0,
        }
    }

    /// Uniform draw by linear interpolation over the box's span. No
    /// projection correction; fine for city-sized regions.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        let lat = self.south + rng.random::<f64>() * (self.north - self.south);
        let lng = self.west + rng.random::<f64>() * (self.east - self.west);

        // Rounding can overshoot by an ulp on spans that aren't exact
        let lat = lat.clamp(self.south, self.north);
        let lng = lng.clamp(self.west, self.east);

        Coordinate { lat, lng }
    }
}

/// Minimal rectangle containing a set of points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Envelope {
    pub fn point(c: Coordinate) -> Self {
        Envelope {
            north: c.lat,
            south: c.lat,
            east: c.lng,
            west: c.lng,
        }
    }

    pub fn of(a: Coordinate, b: Coordinate) -> Self {
        Envelope {
            north: a.lat.max(b.lat),
            south: a.lat.min(b.lat),
            east: a.lng.max(b.lng),
            west: a.lng.min(b.lng),
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: (self.north + self.south) / 2.0,
            lng: (self.east + self.west) / 2.0,
        }
    }
}

/// How the map should be framed once a round is revealed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FramingBounds {
    pub envelope: Envelope,
    pub center: Coordinate,
    /// Screen-space padding around the envelope, in pixels
    pub padding: u32,
}

impl FramingBounds {
    pub fn new(actual: Coordinate, guess: Option<Coordinate>, padding: u32) -> Self {
        match guess {
            Some(guess) => FramingBounds {
                envelope: Envelope::of(actual, guess),
                center: actual.midpoint(&guess),
                padding,
            },
            None => FramingBounds {
                envelope: Envelope::point(actual),
                center: actual,
                padding,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_rejects_inverted_box() {
        assert!(BoundingBox::new(35.78, 35.59, 139.83, 139.61).is_ok());
        assert!(matches!(
            BoundingBox::new(35.59, 35.78, 139.83, 139.61),
            Err(LocationError::EmptyBoundingBox { .. })
        ));
        assert!(BoundingBox::new(35.78, 35.59, 139.61, 139.61).is_err());
        assert!(BoundingBox::new(95.0, 35.59, 139.83, 139.61).is_err());
    }

    #[test]
    fn test_random_points_stay_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        let boxes = [
            BoundingBox::TOKYO,
            BoundingBox::new(90.0, -90.0, 180.0, -180.0).unwrap(),
            BoundingBox::new(-33.0, -34.0, 151.3, 151.0).unwrap(),
            BoundingBox::new(0.000_002, 0.000_001, 0.000_002, 0.000_001).unwrap(),
        ];

        for bounds in boxes {
            for _ in 0..10_000 {
                let c = bounds.random_point(&mut rng);
                assert!(bounds.contains(&c), "{c} escaped {bounds:?}");
                assert!(c.is_valid());
            }
        }
    }

    #[test]
    fn test_random_boxes_contain_their_draws() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..500 {
            let south = rng.random_range(-90.0..89.0);
            let north = rng.random_range(south + 0.001..=90.0);
            let west = rng.random_range(-180.0..179.0);
            let east = rng.random_range(west + 0.001..=180.0);
            let bounds = BoundingBox::new(north, south, east, west).unwrap();

            for _ in 0..100 {
                assert!(bounds.contains(&bounds.random_point(&mut rng)));
            }
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<BoundingBox, _> =
            serde_json::from_str(r#"{"north":35.78,"south":35.59,"east":139.83,"west":139.61}"#);
        assert!(ok.is_ok());

        let bad: Result<BoundingBox, _> =
            serde_json::from_str(r#"{"north":35.0,"south":35.59,"east":139.83,"west":139.61}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_framing_bounds() {
        let actual = Coordinate { lat: 35.0, lng: 139.5 };
        let guess = Coordinate { lat: 35.5, lng: 139.0 };

        let framed = FramingBounds::new(actual, Some(guess), 24);
        assert_eq!(
            framed.envelope,
            Envelope {
                north: 35.5,
                south: 35.0,
                east: 139.5,
                west: 139.0
            }
        );
        assert_eq!(framed.center, Coordinate { lat: 35.25, lng: 139.25 });
        assert_eq!(framed.padding, 24);

        let alone = FramingBounds::new(actual, None, 24);
        assert_eq!(alone.envelope, Envelope::point(actual));
        assert_eq!(alone.center, actual);
    }
}
