//! Location sampling.
//!
//! Draws a random point inside the configured region and checks with the
//! [`MapProvider`] that street-level imagery exists nearby. The sampler keeps
//! no state between calls; retrying is up to the caller.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::location::{BoundingBox, Coordinate};
use crate::provider::{MapProvider, ProviderError};

/// How a drawn point is turned into a playable location.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchStrategy {
    /// Look for a panorama around the drawn point itself
    Direct,
    /// Find the nearest train station first and look for a panorama there.
    /// Stations almost always have imagery, and they make for recognizable
    /// rounds.
    #[default]
    NearestStation,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("no panorama found near {0}")]
    Unavailable(Coordinate),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl SampleError {
    /// Whether drawing again could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SampleError::Unavailable(_) => true,
            SampleError::Provider(e) => e.is_retryable(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LocationSampler {
    bounds: BoundingBox,
    search_radius_m: f64,
    strategy: SearchStrategy,
}

impl LocationSampler {
    pub fn new(bounds: BoundingBox, search_radius_m: f64, strategy: SearchStrategy) -> Self {
        Self {
            bounds,
            search_radius_m,
            strategy,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.bounds, config.search_radius_m, config.strategy)
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// A uniform random point inside the region. Never fails.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        self.bounds.random_point(rng)
    }

    /// Resolve `candidate` to the location of a nearby panorama.
    ///
    /// The returned coordinate is the panorama's own position. A panorama
    /// outside the region does not count, so the result is always inside
    /// the bounds.
    pub async fn validate(
        &self,
        provider: &dyn MapProvider,
        candidate: Coordinate,
    ) -> Result<Coordinate, SampleError> {
        let anchor = match self.strategy {
            SearchStrategy::Direct => candidate,
            SearchStrategy::NearestStation => {
                let stations = provider
                    .find_nearby_stations(candidate, self.search_radius_m)
                    .await?;

                match stations.first() {
                    Some(station) => *station,
                    None => {
                        tracing::debug!(%candidate, "no station near candidate");
                        return Err(SampleError::Unavailable(candidate));
                    }
                }
            }
        };

        match provider
            .find_nearest_panorama(anchor, self.search_radius_m)
            .await?
        {
            Some(panorama) if self.bounds.contains(&panorama) => Ok(panorama),
            Some(panorama) => {
                tracing::debug!(%candidate, %panorama, "nearest panorama is outside the region");
                Err(SampleError::Unavailable(candidate))
            }
            None => Err(SampleError::Unavailable(candidate)),
        }
    }

    /// Draw once and validate.
    pub async fn sample(&self, provider: &dyn MapProvider) -> Result<Coordinate, SampleError> {
        let candidate = self.draw(&mut rand::rng());
        self.validate(provider, candidate).await
    }
}
