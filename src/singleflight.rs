//! Single-Flight Module
//!
//! Collapses concurrent loads of the same key into one execution whose
//! result is broadcast to every waiting caller, protecting the origin from
//! cache stampedes.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{CacheError, Result};

type Outcome<T> = Option<Result<T>>;
type InflightMap<T> = Mutex<HashMap<String, watch::Receiver<Outcome<T>>>>;

// == Flight Group ==
/// Coalesces concurrent calls per key.
///
/// The first caller for a key becomes the leader and runs the work; every
/// caller that arrives while the work is in flight waits for the leader's
/// result instead of starting its own.
#[derive(Default)]
pub struct FlightGroup<T> {
    inflight: InflightMap<T>,
}

/// Removes the in-flight entry when the leader finishes, including when its
/// future is cancelled or panics before publishing. In that case the watch
/// channel closes without a value and waiters synthesize an error rather
/// than deadlock.
struct FlightGuard<'a, T> {
    inflight: &'a InflightMap<T>,
    key: &'a str,
}

impl<T> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        self.inflight.lock().remove(self.key);
    }
}

enum Role<T> {
    Leader(watch::Sender<Outcome<T>>),
    Joiner(watch::Receiver<Outcome<T>>),
}

impl<T: Clone> FlightGroup<T> {
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `work` for `key`, unless a call for the same key is already in
    /// flight, in which case the caller receives that call's result.
    ///
    /// The leader publishes its result before the in-flight entry is
    /// removed, so a waiter that obtained its receiver before removal
    /// always observes the result.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let role = {
            let mut inflight = self.inflight.lock();
            match inflight.get(key) {
                Some(receiver) => Role::Joiner(receiver.clone()),
                None => {
                    let (sender, receiver) = watch::channel(None);
                    inflight.insert(key.to_string(), receiver);
                    Role::Leader(sender)
                }
            }
        };

        match role {
            Role::Joiner(mut receiver) => {
                debug!(key, "joining in-flight call");
                match receiver.wait_for(Option::is_some).await {
                    Ok(outcome) => outcome
                        .clone()
                        .ok_or_else(|| CacheError::Internal("empty flight outcome".to_string()))?,
                    Err(_) => Err(CacheError::Internal(format!(
                        "in-flight call for key {key} was abandoned"
                    ))),
                }
            }
            Role::Leader(sender) => {
                let _guard = FlightGuard {
                    inflight: &self.inflight,
                    key,
                };
                let result = work().await;
                // Publish first; the guard removes the entry afterwards.
                let _ = sender.send(Some(result.clone()));
                result
            }
        }
    }

    /// Number of keys currently in flight.
    pub fn len(&self) -> usize {
        self.inflight.lock().len()
    }

    /// Returns true if no call is in flight.
    pub fn is_empty(&self) -> bool {
        self.inflight.lock().is_empty()
    }
}
