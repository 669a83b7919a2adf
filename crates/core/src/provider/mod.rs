//! Capabilities the game consumes from its host.
//!
//! The core never owns rendering objects or SDK handles. It asks a
//! [`MapProvider`] where imagery exists, tells a [`MapRenderer`] what to draw,
//! and keeps the last location in a [`LocationStore`].

use futures_util::future::BoxFuture;

use crate::location::Coordinate;

pub mod catalog;
pub mod render;
pub mod store;

pub use catalog::CatalogProvider;
pub use render::{MapCommand, MapRenderer, Marker, MarkerKind};
pub use store::{JsonFileLocationStore, LocationStore, MemoryLocationStore, STORAGE_KEY, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Network hiccups, rate limits, SDK timeouts
    #[error("transient provider failure: {0}")]
    Transient(String),

    /// Bad credentials, disabled API, anything a retry can't fix
    #[error("provider failure: {0}")]
    Fatal(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

/// Street-level imagery lookups.
///
/// Both calls suspend; results may arrive long after they were requested.
pub trait MapProvider: Send + Sync {
    /// The closest panorama within `radius_m` of `point`, or `None`
    fn find_nearest_panorama<'a>(
        &'a self,
        point: Coordinate,
        radius_m: f64,
    ) -> BoxFuture<'a, Result<Option<Coordinate>, ProviderError>>;

    /// Train stations within `radius_m` of `point`, nearest first
    fn find_nearby_stations<'a>(
        &'a self,
        point: Coordinate,
        radius_m: f64,
    ) -> BoxFuture<'a, Result<Vec<Coordinate>, ProviderError>>;
}
