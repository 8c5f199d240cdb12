//! Decision cache and per-image concurrency gating.
//!
//! Guarantees at most one concurrent evaluation per (image content, settings)
//! key: the first caller for a key becomes the executor, later callers
//! suspend on a shared channel and observe the executor's outcome. Completed
//! decisions land in a bounded LRU; failures are delivered to every current
//! waiter and then forgotten, so a later call retries from scratch.

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use lru::LruCache;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::domain::ModerationDecision;
use crate::error::ModerationError;

/// Default number of completed decisions retained.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Key identifying one (image content, settings) evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecisionKey {
    /// Fingerprint of the decoded pixel content.
    pub image: u64,
    /// Fingerprint of the settings value.
    pub settings: u64,
}

type Outcome = Result<Arc<ModerationDecision>, ModerationError>;

struct CacheState {
    done: LruCache<DecisionKey, Arc<ModerationDecision>>,
    pending: HashMap<DecisionKey, watch::Receiver<Option<Outcome>>>,
}

/// Bounded decision cache with in-flight deduplication.
pub struct DecisionCache {
    state: Arc<Mutex<CacheState>>,
}

impl DecisionCache {
    /// Creates a cache retaining up to `capacity` completed decisions.
    ///
    /// A zero capacity is bumped to one; eviction capacity bounds memory, it
    /// is not a correctness knob.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Arc::new(Mutex::new(CacheState {
                done: LruCache::new(capacity),
                pending: HashMap::new(),
            })),
        }
    }

    /// Returns the decision for `key`, computing it at most once across all
    /// concurrent callers.
    ///
    /// The computation is spawned onto the runtime, so cancelling the caller
    /// that happened to trigger it does not abort work other waiters rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ModerationError::Evaluation`] when the shared computation
    /// fails; the failure is delivered to every current waiter and the key
    /// is cleared rather than poisoned.
    pub async fn get_or_compute<F, Fut>(&self, key: DecisionKey, compute: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let mut rx = {
            let mut state = self.state.lock().await;

            if let Some(decision) = state.done.get(&key) {
                debug!(?key, "decision cache hit");
                return Ok(Arc::clone(decision));
            }

            if let Some(rx) = state.pending.get(&key) {
                debug!(?key, "joining in-flight evaluation");
                rx.clone()
            } else {
                let (tx, rx) = watch::channel(None);
                state.pending.insert(key, rx.clone());
                drop(state);

                let fut = compute();
                let state = Arc::clone(&self.state);
                tokio::spawn(async move {
                    // A panicking evaluation must still clear its key.
                    let outcome = AssertUnwindSafe(fut).catch_unwind().await.unwrap_or_else(|_| {
                        Err(ModerationError::Evaluation(
                            "evaluation panicked".to_owned(),
                        ))
                    });
                    let mut state = state.lock().await;
                    state.pending.remove(&key);
                    match &outcome {
                        Ok(decision) => {
                            state.done.put(key, Arc::clone(decision));
                        }
                        Err(error) => {
                            warn!(?key, %error, "evaluation failed, key cleared for retry");
                        }
                    }
                    drop(state);
                    let _ = tx.send(Some(outcome));
                });
                rx
            }
        };

        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| ModerationError::Evaluation("evaluation task terminated".to_owned()))?;
        match outcome.as_ref() {
            Some(result) => result.clone(),
            None => Err(ModerationError::Evaluation(
                "evaluation produced no outcome".to_owned(),
            )),
        }
    }
}

impl Default for DecisionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
