//! Catalog data models, types, and traits.

pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::PanoramaCatalog;
pub use types::{CatalogError, Panorama, Result, Station};
