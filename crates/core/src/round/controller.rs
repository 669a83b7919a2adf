//! Drives rounds in real time.
//!
//! The controller is the only owner of the current [`Round`]. Sampling and the
//! countdown run as tokio tasks; each is stamped with the [`Generation`] of the
//! round that launched it, and whatever it reports is dropped if a newer round
//! has started in the meantime. Starting a round also aborts the previous
//! round's tasks, but lookups already inside the provider may still complete,
//! so the generation check is what keeps them out.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::{ConfigError, GameConfig};
use crate::location::Coordinate;
use crate::provider::{LocationStore, MapProvider};
use crate::round::state::{Generation, Round, RoundError, RoundEvent, Transition};
use crate::sampler::LocationSampler;
use crate::scoring::GuessResult;

/// Cheap to clone; all clones drive the same round.
#[derive(Clone)]
pub struct RoundController {
    shared: Arc<Shared>,
}

struct Shared {
    config: GameConfig,
    sampler: LocationSampler,
    provider: Arc<dyn MapProvider>,
    store: Arc<dyn LocationStore>,
    state: Mutex<ControllerState>,
    updates: watch::Sender<Round>,
    /// Generation of the newest location written to the store
    persisted: Mutex<Generation>,
}

struct ControllerState {
    round: Round,
    tasks: Vec<AbortHandle>,
}

impl RoundController {
    pub fn new(
        config: GameConfig,
        provider: Arc<dyn MapProvider>,
        store: Arc<dyn LocationStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let round = Round::idle(&config);
        let (updates, _) = watch::channel(round.clone());

        Ok(Self {
            shared: Arc::new(Shared {
                sampler: LocationSampler::from_config(&config),
                config,
                provider,
                store,
                state: Mutex::new(ControllerState {
                    round,
                    tasks: Vec::new(),
                }),
                updates,
                persisted: Mutex::new(Generation::default()),
            }),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.shared.config
    }

    /// Begin a new round from any state.
    ///
    /// Cancels the countdown and any sampling still in flight, clears the
    /// previous location, guess, and result, and starts sampling. Must be
    /// called from within a tokio runtime.
    pub fn start_round(&self) -> Generation {
        let shared = &self.shared;
        let mut state = shared.lock();

        for task in state.tasks.drain(..) {
            task.abort();
        }

        let generation = state.round.generation().next();
        state.round = Round::sampling(generation, &shared.config);
        shared.publish(&state.round);

        tracing::info!(%generation, "starting round");

        let task = tokio::spawn(Arc::clone(shared).run_sampling(generation));
        state.tasks.push(task.abort_handle());

        generation
    }

    /// Place or move the guess pin
    pub fn set_guess(&self, position: Coordinate) -> Result<(), RoundError> {
        self.shared
            .dispatch(None, RoundEvent::SetGuess(position))
            .map(|_| ())
    }

    /// Show the guess map
    pub fn open_map(&self) {
        let _ = self.shared.dispatch(None, RoundEvent::OpenMap);
    }

    /// Hide the guess map
    pub fn close_map(&self) {
        let _ = self.shared.dispatch(None, RoundEvent::CloseMap);
    }

    /// Lock in the current guess and reveal the answer
    pub fn confirm(&self) -> Result<GuessResult, RoundError> {
        let mut state = self.shared.lock();
        self.shared
            .apply_locked(&mut state, None, RoundEvent::Confirm)?;

        state
            .round
            .result()
            .copied()
            .ok_or(RoundError::NoGuessPlaced)
    }

    /// Reveal the round now, with or without a guess.
    ///
    /// Returns the same result on every call once revealed; `None` if there is
    /// no location yet.
    pub fn finalize(&self) -> Option<GuessResult> {
        let shared = &self.shared;
        let mut state = shared.lock();

        let was_revealed = state.round.result().is_some();
        let result = state.round.finalize();

        if let Some(result) = &result {
            if !was_revealed {
                shared.on_revealed(result);
                shared.publish(&state.round);
            }
        }

        result
    }

    pub fn snapshot(&self) -> Round {
        self.shared.lock().round.clone()
    }

    /// Receives a copy of the round after every change
    pub fn subscribe(&self) -> watch::Receiver<Round> {
        self.shared.updates.subscribe()
    }

    /// The location of the last round played, from the store
    pub fn persisted_location(&self) -> Option<Coordinate> {
        self.shared.store.load()
    }

    /// Stop all background work. The round keeps its current state.
    pub fn shutdown(&self) {
        for task in self.shared.lock().tasks.drain(..) {
            task.abort();
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, round: &Round) {
        self.updates.send_replace(round.clone());
    }

    fn on_revealed(&self, result: &GuessResult) {
        tracing::info!(
            distance_m = result.distance_meters,
            guessed = result.guess.location().is_some(),
            "round revealed"
        );
    }

    /// Apply `event` to the current round.
    ///
    /// `generation` tags results of background work; `None` means the event
    /// comes from the player and targets whatever round is current.
    fn dispatch(
        &self,
        generation: Option<Generation>,
        event: RoundEvent,
    ) -> Result<Transition, RoundError> {
        let mut state = self.lock();
        self.apply_locked(&mut state, generation, event)
    }

    fn apply_locked(
        &self,
        state: &mut ControllerState,
        generation: Option<Generation>,
        event: RoundEvent,
    ) -> Result<Transition, RoundError> {
        let current = state.round.generation();
        if let Some(stale) = generation.filter(|g| *g != current) {
            tracing::trace!(%stale, %current, event = event.name(), "discarding stale result");
            return Err(RoundError::StaleResult { stale, current });
        }

        let name = event.name();
        let transition = state.round.apply(event).inspect_err(|e| {
            tracing::debug!(event = name, error = %e, "rejected round event");
        })?;

        match transition {
            Transition::Unchanged => {}
            Transition::Changed => {
                tracing::debug!(
                    event = name,
                    status = %state.round.status(),
                    "round updated"
                );
                self.publish(&state.round);
            }
            Transition::Revealed => {
                if let Some(result) = state.round.result() {
                    self.on_revealed(result);
                }
                self.publish(&state.round);
            }
        }

        Ok(transition)
    }

    async fn run_sampling(self: Arc<Self>, generation: Generation) {
        let max_attempts = self.config.max_attempts();

        for attempt in 1..=max_attempts {
            let outcome = self.sampler.sample(self.provider.as_ref()).await;

            match outcome {
                Ok(location) => {
                    self.activate(generation, location, attempt);
                    return;
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(%generation, attempt, error = %e, "sampling failed, retrying");

                    let retrying = RoundEvent::SamplingRetrying {
                        attempts_used: attempt,
                    };
                    if self.dispatch(Some(generation), retrying).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(%generation, attempt, error = %e, "sampling gave up");

                    let exhausted = RoundEvent::SamplingExhausted {
                        attempts_used: attempt,
                        reason: e.to_string(),
                    };
                    let _ = self.dispatch(Some(generation), exhausted);
                    return;
                }
            }
        }
    }

    /// Move to Active and start the countdown, unless the round was replaced
    fn activate(self: &Arc<Self>, generation: Generation, location: Coordinate, attempt: u32) {
        {
            let mut state = self.lock();

            let succeeded = RoundEvent::SamplingSucceeded {
                location,
                attempts_used: attempt,
            };
            if self.apply_locked(&mut state, Some(generation), succeeded).is_err() {
                return;
            }

            tracing::info!(%generation, %location, attempts = attempt, "round active");

            let task = tokio::spawn(Arc::clone(self).run_countdown(generation));
            state.tasks.push(task.abort_handle());
        }

        self.persist(generation, location);
    }

    /// Write the location to the store off the async workers.
    ///
    /// Saves from an older generation than the last one written are skipped,
    /// so a slow write cannot clobber a newer round's location.
    fn persist(self: &Arc<Self>, generation: Generation, location: Coordinate) -> JoinHandle<()> {
        let shared = Arc::clone(self);

        tokio::task::spawn_blocking(move || {
            let mut persisted = shared
                .persisted
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if *persisted > generation {
                tracing::trace!(stale = %generation, current = %*persisted, "skipping stale save");
                return;
            }

            shared.store.save(Some(location));
            *persisted = generation;
        })
    }

    async fn run_countdown(self: Arc<Self>, generation: Generation) {
        let period = self.config.tick_interval();
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.dispatch(Some(generation), RoundEvent::Tick) {
                Ok(Transition::Changed) => continue,
                // Revealed by this tick, already over, or replaced
                _ => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::FutureExt;
    use futures_util::future::BoxFuture;

    use super::*;
    use crate::provider::{MemoryLocationStore, ProviderError};
    use crate::round::state::RoundStatus;
    use crate::sampler::SearchStrategy;

    struct AlwaysFound(Coordinate);

    impl MapProvider for AlwaysFound {
        fn find_nearest_panorama<'a>(
            &'a self,
            _point: Coordinate,
            _radius_m: f64,
        ) -> BoxFuture<'a, Result<Option<Coordinate>, ProviderError>> {
            let found = self.0;
            async move { Ok(Some(found)) }.boxed()
        }

        fn find_nearby_stations<'a>(
            &'a self,
            _point: Coordinate,
            _radius_m: f64,
        ) -> BoxFuture<'a, Result<Vec<Coordinate>, ProviderError>> {
            let found = self.0;
            async move { Ok(vec![found]) }.boxed()
        }
    }

    /// A store whose saves block until released
    #[derive(Default)]
    struct BlockingStore {
        released: Mutex<bool>,
        wake: std::sync::Condvar,
    }

    impl BlockingStore {
        fn release(&self) {
            *self.released.lock().unwrap() = true;
            self.wake.notify_all();
        }
    }

    impl LocationStore for BlockingStore {
        fn load(&self) -> Option<Coordinate> {
            None
        }

        fn save(&self, _location: Option<Coordinate>) {
            let mut released = self.released.lock().unwrap();
            while !*released {
                released = self.wake.wait(released).unwrap();
            }
        }
    }

    const PANO: Coordinate = Coordinate {
        lat: 35.68,
        lng: 139.76,
    };

    fn controller() -> RoundController {
        let config = GameConfig {
            strategy: SearchStrategy::Direct,
            ..GameConfig::default()
        };
        RoundController::new(
            config,
            Arc::new(AlwaysFound(PANO)),
            Arc::new(MemoryLocationStore::new()),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_is_discarded() {
        let controller = controller();
        let mut updates = controller.subscribe();

        let first = controller.start_round();
        let second = controller.start_round();
        assert_eq!(second, first.next());

        updates
            .wait_for(|r| r.status() == RoundStatus::Active)
            .await
            .unwrap();
        let before = controller.snapshot();

        let late = controller.shared.dispatch(
            Some(first),
            RoundEvent::SamplingSucceeded {
                location: Coordinate { lat: 1.0, lng: 1.0 },
                attempts_used: 1,
            },
        );

        assert_eq!(
            late,
            Err(RoundError::StaleResult {
                stale: first,
                current: second
            })
        );
        assert_eq!(controller.snapshot(), before);

        let late_tick = controller.shared.dispatch(Some(first), RoundEvent::Tick);
        assert!(late_tick.is_err());
        assert_eq!(controller.snapshot().time_remaining(), before.time_remaining());
    }

    async fn wait_for_store(store: &MemoryLocationStore, expected: Coordinate) {
        while store.load() != Some(expected) {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_is_persisted() {
        let store = Arc::new(MemoryLocationStore::new());
        let controller = RoundController::new(
            GameConfig {
                strategy: SearchStrategy::Direct,
                ..GameConfig::default()
            },
            Arc::new(AlwaysFound(PANO)),
            store.clone(),
        )
        .unwrap();

        assert_eq!(controller.persisted_location(), None);

        let mut updates = controller.subscribe();
        controller.start_round();
        updates
            .wait_for(|r| r.status() == RoundStatus::Active)
            .await
            .unwrap();

        wait_for_store(&store, PANO).await;
        assert_eq!(controller.persisted_location(), Some(PANO));
    }

    #[tokio::test]
    async fn test_stale_save_does_not_overwrite_newer() {
        let store = Arc::new(MemoryLocationStore::new());
        let controller = RoundController::new(
            GameConfig::default(),
            Arc::new(AlwaysFound(PANO)),
            store.clone(),
        )
        .unwrap();
        let newer = Coordinate { lat: 35.7, lng: 139.7 };

        let shared = &controller.shared;
        shared.persist(Generation(2), newer).await.unwrap();
        shared.persist(Generation(1), PANO).await.unwrap();

        assert_eq!(store.load(), Some(newer));

        shared.persist(Generation(3), PANO).await.unwrap();
        assert_eq!(store.load(), Some(PANO));
    }

    #[tokio::test]
    async fn test_round_calls_do_not_wait_for_store() {
        let store = Arc::new(BlockingStore::default());
        let controller = RoundController::new(
            GameConfig {
                strategy: SearchStrategy::Direct,
                ..GameConfig::default()
            },
            Arc::new(AlwaysFound(PANO)),
            store.clone(),
        )
        .unwrap();
        let mut updates = controller.subscribe();

        controller.start_round();
        updates
            .wait_for(|r| r.status() == RoundStatus::Active)
            .await
            .unwrap();

        // The save is still stuck, but the round is playable
        controller.set_guess(PANO).unwrap();
        assert_eq!(controller.snapshot().guess_location(), Some(PANO));
        assert!(controller.confirm().is_ok());

        store.release();
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = GameConfig {
            time_limit: 0,
            ..GameConfig::default()
        };

        assert!(
            RoundController::new(
                config,
                Arc::new(AlwaysFound(PANO)),
                Arc::new(MemoryLocationStore::new()),
            )
            .is_err()
        );
    }
}
