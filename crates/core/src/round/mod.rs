//! Round lifecycle: idle, sampling, countdown, guess, reveal.

pub mod controller;
pub mod state;

pub use controller::RoundController;
pub use state::{
    EXHAUSTED_MESSAGE, Generation, RETRYING_MESSAGE, Round, RoundError, RoundEvent, RoundStatus,
    Transition,
};
