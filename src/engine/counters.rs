use async_trait::async_trait;
use tokio::sync::Mutex;

use super::cache::Cache;
use crate::{
    entities::{Counter, Persistence},
    error::{not_found_error, Error},
    store::PlaceStore,
};

/// Applies a single +1 to a place's counter.
#[async_trait]
pub trait CounterWriter: Send + Sync {
    async fn increment(&self, id: &str, counter: Counter) -> Result<(), Error>;

    /// Whether the cache has to be reloaded for the write to show.
    fn refreshes_cache(&self) -> bool;
}

/// Mutates the cached record only, holding the cache lock for the update.
pub struct LocalCounters<'a> {
    cache: &'a Mutex<Cache>,
}

/// Atomic increment in the store. The cache is not touched.
pub struct RemoteCounters<'a> {
    store: &'a dyn PlaceStore,
}

impl<'a> LocalCounters<'a> {
    pub fn new(cache: &'a Mutex<Cache>) -> Self {
        Self { cache }
    }
}

impl<'a> RemoteCounters<'a> {
    pub fn new(store: &'a dyn PlaceStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<'a> CounterWriter for LocalCounters<'a> {
    async fn increment(&self, id: &str, counter: Counter) -> Result<(), Error> {
        let mut cache = self.cache.lock().await;
        let place = cache.find_mut(id).ok_or_else(not_found_error)?;
        place.increment(counter, 1);

        tracing::debug!(
            "{} of {} is now {} locally",
            counter.field_name(),
            id,
            place.counter(counter)
        );

        Ok(())
    }

    fn refreshes_cache(&self) -> bool {
        false
    }
}

#[async_trait]
impl<'a> CounterWriter for RemoteCounters<'a> {
    async fn increment(&self, id: &str, counter: Counter) -> Result<(), Error> {
        self.store.increment(id, counter, 1).await
    }

    fn refreshes_cache(&self) -> bool {
        true
    }
}

pub fn writer_for<'a>(
    persistence: Persistence,
    cache: &'a Mutex<Cache>,
    store: &'a dyn PlaceStore,
) -> Box<dyn CounterWriter + 'a> {
    match persistence {
        Persistence::Local => Box::new(LocalCounters::new(cache)),
        Persistence::Remote => Box::new(RemoteCounters::new(store)),
    }
}

#[test]
fn local_counters_test() {
    use super::cache::CacheSource;
    use super::demo;
    use crate::store::MemoryStore;
    use tokio_test::block_on;

    let store = MemoryStore::new();
    let mut cache = Cache::new();
    cache.install(1, demo::places(), CacheSource::Demo);
    let cache = Mutex::new(cache);

    let writer = writer_for(Persistence::Local, &cache, &store);
    block_on(writer.increment("demo-3", Counter::Confirmations)).unwrap();
    block_on(writer.increment("demo-3", Counter::Reports)).unwrap();
    assert!(!writer.refreshes_cache());

    let err = block_on(writer.increment("missing", Counter::Reports)).unwrap_err();
    assert!(err.is_not_found_error());

    let cache = block_on(cache.lock());
    let place = cache.find("demo-3").unwrap();
    assert_eq!(place.confirmations, 2);
    assert_eq!(place.reports, 1);
    assert!(block_on(store.increment_calls()).is_empty());
}

#[test]
fn remote_counters_test() {
    use crate::entities::submission::test_submission;
    use crate::store::MemoryStore;
    use tokio_test::block_on;

    let store = MemoryStore::new();
    let id = block_on(store.insert(&test_submission("cafe", &[]))).unwrap();
    let cache = Mutex::new(Cache::new());

    let writer = writer_for(Persistence::Remote, &cache, &store);
    block_on(writer.increment(&id, Counter::Confirmations)).unwrap();
    assert!(writer.refreshes_cache());

    assert_eq!(
        block_on(store.increment_calls()),
        vec![(id.clone(), Counter::Confirmations, 1)]
    );
    assert_eq!(block_on(store.get(&id)).unwrap().confirmations, 1);
    assert!(block_on(cache.lock()).places().is_empty());
}
