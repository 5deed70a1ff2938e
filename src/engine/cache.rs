use serde::{Deserialize, Serialize};

use super::demo;
use crate::{
    entities::{Persistence, Place},
    store::PlaceStore,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSource {
    /// Nothing loaded yet.
    Unloaded,
    Remote,
    Demo,
}

/// Ordered places as last loaded, shared by every viewer.
#[derive(Clone, Debug)]
pub struct Cache {
    places: Vec<Place>,
    source: CacheSource,
    generation: u64,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            places: Vec::new(),
            source: CacheSource::Unloaded,
            generation: 0,
        }
    }
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn source(&self) -> CacheSource {
        self.source
    }

    /// Replaces the whole content with the result of load `generation`;
    /// nothing is merged. A load started before the installed one is
    /// dropped. Returns whether the places were installed.
    pub fn install(&mut self, generation: u64, places: Vec<Place>, source: CacheSource) -> bool {
        if generation < self.generation {
            return false;
        }

        self.places = places;
        self.source = source;
        self.generation = generation;

        true
    }

    pub fn find(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Place> {
        self.places.iter_mut().find(|p| p.id == id)
    }

    /// Ids this cache does not hold are assumed to live in the store.
    pub fn persistence_of(&self, id: &str) -> Persistence {
        self.find(id)
            .map(|p| p.persistence)
            .unwrap_or(Persistence::Remote)
    }
}

/// Reads every place newest first, falling back to the demo places when the
/// store has none or cannot be reached. Never fails.
#[tracing::instrument(skip(store))]
pub async fn fetch_or_demo(store: &dyn PlaceStore) -> (Vec<Place>, CacheSource) {
    match store.fetch_all().await {
        Ok(places) if !places.is_empty() => {
            tracing::info!("loaded {} places", places.len());
            (places, CacheSource::Remote)
        }
        Ok(_) => {
            tracing::info!("no stored places, showing demo places");
            (demo::places(), CacheSource::Demo)
        }
        Err(err) => {
            tracing::error!("error loading places: {}", err);
            (demo::places(), CacheSource::Demo)
        }
    }
}

#[test]
fn fetch_or_demo_empty_store_test() {
    use crate::store::MemoryStore;
    use tokio_test::block_on;

    let store = MemoryStore::new();
    let (places, source) = block_on(fetch_or_demo(&store));

    assert_eq!(source, CacheSource::Demo);
    assert_eq!(places.len(), 4);
    assert!(places.iter().all(|p| p.is_demo()));
}

#[test]
fn fetch_or_demo_failing_store_test() {
    use crate::store::MemoryStore;
    use tokio_test::block_on;

    let store = MemoryStore::new();
    store.set_failing(true);

    let (places, source) = block_on(fetch_or_demo(&store));

    assert_eq!(source, CacheSource::Demo);
    assert_eq!(places, demo::places());
}

#[test]
fn fetch_or_demo_remote_test() {
    use crate::entities::submission::test_submission;
    use crate::store::MemoryStore;
    use tokio_test::block_on;

    let store = MemoryStore::new();
    let older = block_on(store.insert(&test_submission("older", &[]))).unwrap();
    let newer = block_on(store.insert(&test_submission("newer", &[]))).unwrap();

    let (places, source) = block_on(fetch_or_demo(&store));

    assert_eq!(source, CacheSource::Remote);
    assert_eq!(places.len(), 2);
    assert_eq!(places[0].id, newer);
    assert_eq!(places[1].id, older);
    assert!(places.iter().all(|p| !p.is_demo()));
}

#[test]
fn cache_lookup_test() {
    use crate::entities::place::test_place;

    let mut cache = Cache::new();
    assert!(cache.places().is_empty());
    assert_eq!(cache.source(), CacheSource::Unloaded);

    let mut demo_place = test_place("demo-x", &[], 0);
    demo_place.persistence = Persistence::Local;
    assert!(cache.install(1, vec![test_place("a", &[], 0), demo_place], CacheSource::Remote));

    assert_eq!(cache.persistence_of("a"), Persistence::Remote);
    assert_eq!(cache.persistence_of("demo-x"), Persistence::Local);
    assert_eq!(cache.persistence_of("unknown"), Persistence::Remote);

    cache.find_mut("a").unwrap().confirmations = 9;
    assert_eq!(cache.find("a").unwrap().confirmations, 9);

    assert!(cache.install(2, vec![], CacheSource::Remote));
    assert!(cache.find("a").is_none());
}

#[test]
fn cache_drops_stale_load_test() {
    use crate::entities::place::test_place;

    let mut cache = Cache::new();

    assert!(cache.install(2, vec![test_place("newer", &[], 0)], CacheSource::Remote));
    assert!(!cache.install(1, demo::places(), CacheSource::Demo));

    assert_eq!(cache.source(), CacheSource::Remote);
    assert_eq!(cache.places().len(), 1);
    assert_eq!(cache.places()[0].id, "newer");
}
