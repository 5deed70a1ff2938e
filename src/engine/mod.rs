mod cache;
mod counters;
mod demo;
mod place_api;

pub use cache::{Cache, CacheSource};
pub use counters::{CounterWriter, LocalCounters, RemoteCounters};

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::{
    entities::{Counter, Notice, Persistence},
    store::DynStore,
};

pub const SUBMITTED: &str = "Thanks \u{2014} your accessibility info helps others";
pub const SUBMIT_FAILED: &str = "Failed to add place. Please try again.";
pub const CONFIRMED: &str = "Thanks \u{2014} your confirmation is recorded";
pub const CONFIRMED_DEMO: &str = "Thanks \u{2014} your confirmation is recorded (demo)";
pub const CONFIRM_FAILED: &str = "Failed to confirm. Please try again.";
pub const REPORTED: &str = "Thanks \u{2014} the issue was reported for review";
pub const REPORTED_DEMO: &str = "Thanks \u{2014} the issue was reported (demo)";
pub const REPORT_FAILED: &str = "Failed to report. Try again later.";

/// Shared by every client. Store calls never run under the cache lock.
pub struct Engine {
    store: DynStore,
    cache: Mutex<Cache>,
    loads: AtomicU64,
}

impl Engine {
    pub fn new(store: DynStore) -> Self {
        Self {
            store,
            cache: Mutex::new(Cache::new()),
            loads: AtomicU64::new(0),
        }
    }

    /// Fetches without holding the cache, then installs the result unless a
    /// later load already finished.
    async fn reload(&self) -> CacheSource {
        let generation = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        let (places, source) = cache::fetch_or_demo(self.store.as_ref()).await;

        let mut cache = self.cache.lock().await;

        if cache.install(generation, places, source) {
            source
        } else {
            tracing::debug!("dropped load {} superseded by a later one", generation);
            cache.source()
        }
    }

    /// Adds one to a place's counter through the writer its persistence
    /// calls for, reloading afterwards when the write went to the store.
    #[tracing::instrument(skip(self))]
    async fn bump(&self, id: &str, counter: Counter) -> Notice {
        let persistence = self.cache.lock().await.persistence_of(id);

        let writer = counters::writer_for(persistence, &self.cache, self.store.as_ref());
        let result = writer.increment(id, counter).await;

        match result {
            Ok(()) => {
                if writer.refreshes_cache() {
                    self.reload().await;
                }

                let message = match (counter, persistence) {
                    (Counter::Confirmations, Persistence::Local) => CONFIRMED_DEMO,
                    (Counter::Confirmations, Persistence::Remote) => CONFIRMED,
                    (Counter::Reports, Persistence::Local) => REPORTED_DEMO,
                    (Counter::Reports, Persistence::Remote) => REPORTED,
                };

                Notice::success(message)
            }
            Err(err) => {
                tracing::error!("error incrementing {} of {}: {}", counter.field_name(), id, err);

                match counter {
                    Counter::Confirmations => Notice::alert(CONFIRM_FAILED),
                    Counter::Reports => Notice::alert(REPORT_FAILED),
                }
            }
        }
    }
}

