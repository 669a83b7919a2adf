//! # street-guess-catalog
//!
//! Offline panorama and station catalog with spatial queries.
//!
//! ## Features
//!
//! - **Offline-first**: panoramas and stations loaded from GeoJSON bundles
//! - **Spatial queries**: R-tree indexing with haversine post-filtering
//! - **Station bias**: find train stations near a point to steer sampling
//!   toward places with street-level imagery
//!
//! ## Example
//!
//! ```
//! use street_guess_catalog::prelude::*;
//! use geo::Point;
//!
//! let catalog = StaticPanoramaCatalog::from_data(
//!     vec![Panorama::new("shibuya_crossing", Point::new(139.7005, 35.6595))],
//!     vec![Station::new("shibuya", "Shibuya", Point::new(139.7016, 35.6580))],
//! );
//!
//! let point = Point::new(139.7010, 35.6590);
//! let stations = catalog.stations_near(point, 500.0);
//! assert_eq!(stations.len(), 1);
//!
//! let pano = catalog.nearest_panorama(stations[0].location, 500.0);
//! assert_eq!(pano.map(|p| p.id.as_ref()), Some("shibuya_crossing"));
//! ```

pub mod models;
pub mod provider;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::models::{traits::*, types::*};
    pub use crate::provider::static_provider::StaticPanoramaCatalog;
}

pub use prelude::*;
