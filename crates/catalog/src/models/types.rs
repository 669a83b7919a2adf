//! Core data types for catalog entries.

use std::sync::Arc;

use geo::Point;

// ============================================================================
// Data Structures
// ============================================================================

/// A street-level panorama capture point.
///
/// `location` follows the `geo` convention: x is longitude, y is latitude.
#[derive(Clone, Debug, PartialEq)]
pub struct Panorama {
    /// Bundle-assigned label, only used in logs
    pub id: Arc<str>,
    pub location: Point,
}

impl Panorama {
    pub fn new(id: &str, location: Point) -> Self {
        Self {
            id: id.into(),
            location,
        }
    }
}

/// A train station, used to bias sampling toward places with imagery.
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub location: Point,
}

impl Station {
    pub fn new(id: &str, name: &str, location: Point) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_name_is_shared() {
        let station = Station::new("ueno", "Ueno", Point::new(139.7774, 35.7141));
        let copy = station.clone();

        assert!(Arc::ptr_eq(&station.name, &copy.name));
        assert_eq!(copy.id.as_ref(), "ueno");
    }

    #[test]
    fn test_error_display() {
        let err = CatalogError::InvalidData("feature 3 has no id".into());
        assert_eq!(err.to_string(), "Invalid data: feature 3 has no id");
    }
}
