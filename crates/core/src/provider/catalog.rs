use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use street_guess_catalog::PanoramaCatalog;

use crate::location::Coordinate;
use crate::provider::{MapProvider, ProviderError};

/// Serves panorama lookups from an offline catalog.
#[derive(Clone)]
pub struct CatalogProvider {
    catalog: Arc<dyn PanoramaCatalog>,
    latency: Option<Duration>,
}

impl CatalogProvider {
    pub fn new(catalog: Arc<dyn PanoramaCatalog>) -> Self {
        Self {
            catalog,
            latency: None,
        }
    }

    /// Delay every lookup, to behave like a remote service
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl MapProvider for CatalogProvider {
    fn find_nearest_panorama<'a>(
        &'a self,
        point: Coordinate,
        radius_m: f64,
    ) -> BoxFuture<'a, Result<Option<Coordinate>, ProviderError>> {
        async move {
            self.wait().await;

            let found = self.catalog.nearest_panorama(point.into(), radius_m);
            if let Some(pano) = found {
                tracing::trace!(panorama = %pano.id, %point, "panorama lookup hit");
            }

            Ok(found.map(|pano| Coordinate::from(pano.location)))
        }
        .boxed()
    }

    fn find_nearby_stations<'a>(
        &'a self,
        point: Coordinate,
        radius_m: f64,
    ) -> BoxFuture<'a, Result<Vec<Coordinate>, ProviderError>> {
        async move {
            self.wait().await;

            let stations = self.catalog.stations_near(point.into(), radius_m);
            if let Some(nearest) = stations.first() {
                tracing::trace!(
                    station = %nearest.id,
                    name = %nearest.name,
                    count = stations.len(),
                    "nearest station"
                );
            }

            Ok(stations
                .into_iter()
                .map(|station| Coordinate::from(station.location))
                .collect())
        }
        .boxed()
    }
}
