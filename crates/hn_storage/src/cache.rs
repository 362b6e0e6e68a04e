use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use futures::future::{BoxFuture, FutureExt, Shared};
use hn_core::{Digest, DigestBuilder, Error, Result};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

type SharedBuild = Shared<BoxFuture<'static, Result<Arc<Digest>>>>;

struct InFlight {
    id: u64,
    build: SharedBuild,
}

#[derive(Default)]
struct CacheState {
    entries: BTreeMap<NaiveDate, Arc<Digest>>,
    in_flight: HashMap<NaiveDate, InFlight>,
    next_build_id: u64,
}

impl CacheState {
    /// Drop entries more than `days` older than the newest one.
    fn prune(&mut self, days: u32) {
        let Some(newest) = self.entries.keys().next_back().copied() else {
            return;
        };
        if let Some(cutoff) = newest.checked_sub_days(Days::new(days as u64)) {
            let kept = self.entries.split_off(&cutoff);
            let dropped = std::mem::replace(&mut self.entries, kept);
            if !dropped.is_empty() {
                debug!(count = dropped.len(), %cutoff, "Pruned old digests");
            }
        }
    }
}

/// In-memory digest store, one entry per date.
///
/// At most one build per date runs at a time: callers arriving while a build
/// is in flight await that build instead of starting another. Builds run on
/// their own task, so a caller that goes away does not cancel them.
pub struct DigestCache {
    builder: Arc<dyn DigestBuilder>,
    state: Arc<Mutex<CacheState>>,
    retention_days: Option<u32>,
}

impl fmt::Debug for DigestCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestCache")
            .field("builder", &"<dyn DigestBuilder>")
            .field("retention_days", &self.retention_days)
            .finish()
    }
}

impl DigestCache {
    pub fn new(builder: Arc<dyn DigestBuilder>) -> Self {
        Self {
            builder,
            state: Arc::new(Mutex::new(CacheState::default())),
            retention_days: None,
        }
    }

    /// Keep only digests within `days` of the newest one. Unbounded by default.
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = Some(days);
        self
    }

    pub async fn get(&self, date: NaiveDate) -> Option<Arc<Digest>> {
        self.state.lock().await.entries.get(&date).cloned()
    }

    pub async fn dates(&self) -> Vec<NaiveDate> {
        self.state.lock().await.entries.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_building(&self, date: NaiveDate) -> bool {
        self.state.lock().await.in_flight.contains_key(&date)
    }

    /// Cached digest for `date`, building it on a miss.
    pub async fn get_or_build(&self, date: NaiveDate) -> Result<Arc<Digest>> {
        let build = {
            let mut state = self.state.lock().await;
            if let Some(digest) = state.entries.get(&date) {
                debug!(%date, "Digest cache hit");
                return Ok(digest.clone());
            }
            self.join_or_start(&mut state, date)
        };
        build.await
    }

    /// Rebuild `date` and replace the cached entry. A failed rebuild leaves
    /// the previous entry in place.
    pub async fn refresh(&self, date: NaiveDate) -> Result<Arc<Digest>> {
        let build = {
            let mut state = self.state.lock().await;
            self.join_or_start(&mut state, date)
        };
        build.await
    }

    fn join_or_start(&self, state: &mut CacheState, date: NaiveDate) -> SharedBuild {
        if let Some(running) = state.in_flight.get(&date) {
            debug!(%date, "Joining in-flight digest build");
            return running.build.clone();
        }

        info!(%date, "Starting digest build");
        let id = state.next_build_id;
        state.next_build_id += 1;
        let builder = Arc::clone(&self.builder);
        let shared_state = Arc::clone(&self.state);
        let task_state = Arc::clone(&self.state);
        let retention_days = self.retention_days;

        let task = tokio::spawn(async move {
            let outcome = builder.build(date).await.map(Arc::new);

            let mut state = task_state.lock().await;
            state.in_flight.remove(&date);
            match &outcome {
                Ok(digest) => {
                    state.entries.insert(date, Arc::clone(digest));
                    if let Some(days) = retention_days {
                        state.prune(days);
                    }
                    info!(%date, count = digest.story_count(), "Digest cached");
                }
                Err(e) => warn!(%date, error = %e, "Digest build failed, nothing cached"),
            }
            outcome
        });

        // A panicking task never reaches its own cleanup, so the slot is
        // released here instead.
        let build = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let mut state = shared_state.lock().await;
                    if state.in_flight.get(&date).is_some_and(|running| running.id == id) {
                        state.in_flight.remove(&date);
                    }
                    error!(%date, error = %e, "Digest build task aborted");
                    Err(Error::Internal(format!("digest build task failed: {}", e)))
                }
            }
        }
        .boxed()
        .shared();

        state.in_flight.insert(date, InFlight { id, build: build.clone() });
        build
    }
}
