#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::Notify;

use street_guess_core::provider::{LocationStore, MapProvider, ProviderError};
use street_guess_core::Coordinate;

pub enum Response {
    Found(Coordinate),
    NotFound,
    Fail(ProviderError),
    /// Hold the lookup open until notified, then answer
    Held(Arc<Notify>, Coordinate),
}

/// Answers panorama lookups from a queue; an empty queue means nothing found.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Response>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(responses: impl IntoIterator<Item = Response>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MapProvider for ScriptedProvider {
    fn find_nearest_panorama<'a>(
        &'a self,
        _point: Coordinate,
        _radius_m: f64,
    ) -> BoxFuture<'a, Result<Option<Coordinate>, ProviderError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.responses.lock().unwrap().pop_front();

        async move {
            match response {
                Some(Response::Found(c)) => Ok(Some(c)),
                Some(Response::NotFound) | None => Ok(None),
                Some(Response::Fail(e)) => Err(e),
                Some(Response::Held(gate, c)) => {
                    gate.notified().await;
                    Ok(Some(c))
                }
            }
        }
        .boxed()
    }

    fn find_nearby_stations<'a>(
        &'a self,
        point: Coordinate,
        _radius_m: f64,
    ) -> BoxFuture<'a, Result<Vec<Coordinate>, ProviderError>> {
        async move { Ok(vec![point]) }.boxed()
    }
}

/// Saves happen on a blocking thread after activation; spin until one lands.
pub async fn wait_for_store(store: &dyn LocationStore, expected: Coordinate) {
    while store.load() != Some(expected) {
        tokio::task::yield_now().await;
    }
}
