//! Coordinates, the sampling region, and reveal framing.

mod bounds;
mod coordinate;

pub use bounds::{BoundingBox, Envelope, FramingBounds};
pub use coordinate::Coordinate;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("bounding box is empty: north {north}, south {south}, east {east}, west {west}")]
    EmptyBoundingBox {
        north: f64,
        south: f64,
        east: f64,
        west: f64,
    },
}
