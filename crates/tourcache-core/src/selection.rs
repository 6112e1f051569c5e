//! Pinned home-page selections and the shared random source behind them.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Duration;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::error::Result;
use crate::models::Domain;

/// Number of records shown on a home listing and in related items.
pub const HOME_SELECTION_SIZE: usize = 4;

/// Random sampling behind a lock, seedable for reproducible selections.
pub struct Sampler {
    rng: Mutex<StdRng>,
}

impl Sampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Up to `amount` distinct items drawn uniformly at random.
    pub fn sample<T: Clone>(&self, items: &[T], amount: usize) -> Vec<T> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        items.choose_multiple(&mut *rng, amount).cloned().collect()
    }
}

/// Per-domain pinned ID lists.
///
/// A selection is made once per TTL window and reused by every request in
/// that window regardless of language. Pinned IDs are not re-checked against
/// later source refreshes.
pub struct StableSelectionCache {
    selections: TtlCache<Domain, Vec<String>>,
}

impl StableSelectionCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            selections: TtlCache::new("selection", ttl, clock),
        }
    }

    /// The pinned IDs for `domain`, running `pick` when there is no live selection.
    pub async fn select<F, Fut>(&self, domain: Domain, pick: F) -> Result<Arc<Vec<String>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<String>>>,
    {
        self.selections
            .get_or_refresh(domain, || async move {
                let ids = pick().await?;
                info!(domain = %domain, ids = ?ids, "Pinned new home selection");
                Ok(ids)
            })
            .await
    }
}
