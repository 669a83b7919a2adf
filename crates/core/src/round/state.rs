//! Round state and its transition function.
//!
//! Everything here is synchronous and free of timers or I/O, so the whole
//! lifecycle can be driven event by event in tests. Scheduling lives in
//! [`super::controller`].

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::location::{Coordinate, FramingBounds, LocationError};
use crate::scoring::{Guess, GuessResult};

pub const RETRYING_MESSAGE: &str = "No panorama found, retrying...";
pub const EXHAUSTED_MESSAGE: &str = "No panorama found, please try again later.";

/// Identifies which round an asynchronous result belongs to.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum RoundStatus {
    #[default]
    Idle,
    Sampling,
    Active,
    Guessed,
    Revealed,
}

#[derive(Clone, Debug, PartialEq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RoundEvent {
    /// An attempt came back empty and another one is on its way
    SamplingRetrying { attempts_used: u32 },
    SamplingSucceeded {
        location: Coordinate,
        attempts_used: u32,
    },
    SamplingExhausted { attempts_used: u32, reason: String },
    SetGuess(Coordinate),
    OpenMap,
    CloseMap,
    Confirm,
    Tick,
}

impl RoundEvent {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// What an accepted event did to the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Changed,
    /// The round was finalized by this event
    Revealed,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoundError {
    #[error("cannot handle {event} while the round is {status}")]
    InvalidTransition {
        event: &'static str,
        status: RoundStatus,
    },

    #[error("no guess has been placed")]
    NoGuessPlaced,

    #[error("invalid guess: {0}")]
    InvalidGuess(#[from] LocationError),

    /// The result belongs to a round that has since been replaced
    #[error("result from round {stale} arrived during round {current}")]
    StaleResult {
        stale: Generation,
        current: Generation,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    generation: Generation,
    status: RoundStatus,
    actual_location: Option<Coordinate>,
    guess_location: Option<Coordinate>,
    time_remaining: u32,
    time_limit: u32,
    attempts_used: u32,
    map_open: bool,
    message: Option<String>,
    result: Option<GuessResult>,
    framing: Option<FramingBounds>,
    frame_padding: u32,
}

impl Round {
    /// The state before any round was started
    pub fn idle(config: &GameConfig) -> Self {
        Self {
            generation: Generation::default(),
            status: RoundStatus::Idle,
            actual_location: None,
            guess_location: None,
            time_remaining: config.time_limit,
            time_limit: config.time_limit,
            attempts_used: 0,
            map_open: false,
            message: None,
            result: None,
            framing: None,
            frame_padding: config.frame_padding,
        }
    }

    /// A fresh round waiting for its location
    pub fn sampling(generation: Generation, config: &GameConfig) -> Self {
        Self {
            generation,
            status: RoundStatus::Sampling,
            ..Self::idle(config)
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn actual_location(&self) -> Option<Coordinate> {
        self.actual_location
    }

    pub fn guess_location(&self) -> Option<Coordinate> {
        self.guess_location
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    /// Whether the guess map is shown over the panorama
    pub fn map_open(&self) -> bool {
        self.map_open
    }

    /// Status text for the player, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn result(&self) -> Option<&GuessResult> {
        self.result.as_ref()
    }

    /// Map framing for the reveal; set together with the result
    pub fn framing(&self) -> Option<&FramingBounds> {
        self.framing.as_ref()
    }

    pub fn apply(&mut self, event: RoundEvent) -> Result<Transition, RoundError> {
        let invalid = RoundError::InvalidTransition {
            event: event.name(),
            status: self.status,
        };

        match (self.status, event) {
            (RoundStatus::Sampling, RoundEvent::SamplingRetrying { attempts_used }) => {
                self.attempts_used = attempts_used;
                self.message = Some(RETRYING_MESSAGE.to_string());
                Ok(Transition::Changed)
            }

            (
                RoundStatus::Sampling,
                RoundEvent::SamplingSucceeded {
                    location,
                    attempts_used,
                },
            ) => {
                self.status = RoundStatus::Active;
                self.actual_location = Some(location);
                self.attempts_used = attempts_used;
                self.time_remaining = self.time_limit;
                self.message = None;
                Ok(Transition::Changed)
            }

            (RoundStatus::Sampling, RoundEvent::SamplingExhausted { attempts_used, .. }) => {
                self.status = RoundStatus::Idle;
                self.attempts_used = attempts_used;
                self.message = Some(EXHAUSTED_MESSAGE.to_string());
                Ok(Transition::Changed)
            }

            (RoundStatus::Active, RoundEvent::SetGuess(position)) => {
                let position = Coordinate::new(position.lat, position.lng)?;
                if self.guess_location == Some(position) {
                    return Ok(Transition::Unchanged);
                }
                self.guess_location = Some(position);
                Ok(Transition::Changed)
            }

            (_, RoundEvent::OpenMap) => Ok(self.set_map_open(true)),
            (_, RoundEvent::CloseMap) => Ok(self.set_map_open(false)),

            (RoundStatus::Active, RoundEvent::Confirm) => {
                if self.guess_location.is_none() {
                    return Err(RoundError::NoGuessPlaced);
                }
                self.status = RoundStatus::Guessed;
                self.finalize();
                Ok(Transition::Revealed)
            }
            (RoundStatus::Revealed, RoundEvent::Confirm) => Ok(Transition::Unchanged),

            (RoundStatus::Active, RoundEvent::Tick) => {
                self.time_remaining = self.time_remaining.saturating_sub(1);
                if self.time_remaining == 0 {
                    self.finalize();
                    return Ok(Transition::Revealed);
                }
                Ok(Transition::Changed)
            }
            // A tick racing a confirm; the countdown stops on its own
            (_, RoundEvent::Tick) => Ok(Transition::Unchanged),

            _ => Err(invalid),
        }
    }

    /// Score the round and reveal it.
    ///
    /// Idempotent: once revealed, further calls return the same result and
    /// change nothing. Returns `None` while there is no location to score.
    pub fn finalize(&mut self) -> Option<GuessResult> {
        match self.status {
            RoundStatus::Revealed => self.result,
            RoundStatus::Active | RoundStatus::Guessed => {
                let actual = self.actual_location?;
                let result = GuessResult::new(actual, Guess::from(self.guess_location));

                self.status = RoundStatus::Revealed;
                self.result = Some(result);
                self.framing = Some(FramingBounds::new(
                    actual,
                    self.guess_location,
                    self.frame_padding,
                ));
                self.map_open = true;

                Some(result)
            }
            RoundStatus::Idle | RoundStatus::Sampling => None,
        }
    }

    fn set_map_open(&mut self, open: bool) -> Transition {
        if self.map_open == open {
            return Transition::Unchanged;
        }
        self.map_open = open;
        Transition::Changed
    }
}
