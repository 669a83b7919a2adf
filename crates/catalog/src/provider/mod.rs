//! Catalog providers.

pub mod loader;
pub mod static_provider;

pub use static_provider::StaticPanoramaCatalog;
