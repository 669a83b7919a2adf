//! Round engine for a street-level geography guessing game.
//!
//! A round samples a playable location inside a region, counts down while the
//! player places a pin, and scores the guess by great-circle distance.

pub mod config;
pub mod location;
pub mod presenter;
pub mod provider;
pub mod round;
pub mod sampler;
pub mod scoring;

// Re-export the catalog from the catalog crate
pub use street_guess_catalog as catalog;

pub use config::{ConfigError, GameConfig};
pub use location::{BoundingBox, Coordinate, Envelope, FramingBounds, LocationError};
pub use round::{Generation, Round, RoundController, RoundError, RoundStatus};
pub use sampler::{LocationSampler, SampleError, SearchStrategy};
pub use scoring::{Guess, GuessResult, marker_scale, score};
