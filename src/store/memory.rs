use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::PlaceStore;
use crate::{
    entities::{Counter, Place, Submission},
    error::{not_found_error, upstream_error, Error},
};

/// Process-local store for development and tests.
///
/// Counts calls per operation and can be switched into a failing mode to
/// stand in for an unreachable remote service.
#[derive(Debug, Default)]
pub struct MemoryStore {
    places: Mutex<Vec<(u64, Place)>>,
    next_seq: AtomicUsize,
    failing: AtomicBool,
    fetches: AtomicUsize,
    inserts: AtomicUsize,
    increments: Mutex<Vec<(String, Counter, u64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(AtomicOrdering::SeqCst)
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(AtomicOrdering::SeqCst)
    }

    /// Every increment issued so far, failed ones included.
    pub async fn increment_calls(&self) -> Vec<(String, Counter, u64)> {
        self.increments.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Place> {
        self.places
            .lock()
            .await
            .iter()
            .find(|(_, place)| place.id == id)
            .map(|(_, place)| place.clone())
    }

    fn check_available(&self) -> Result<(), Error> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(upstream_error());
        }

        Ok(())
    }
}

#[async_trait]
impl PlaceStore for MemoryStore {
    #[tracing::instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Place>, Error> {
        self.fetches.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_available()?;

        let mut places = self.places.lock().await.clone();

        places.sort_by(|(a_seq, a), (b_seq, b)| (b.created_at, b_seq).cmp(&(a.created_at, a_seq)));

        Ok(places.into_iter().map(|(_, place)| place).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, submission: &Submission) -> Result<String, Error> {
        self.inserts.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_available()?;

        let id = Uuid::new_v4().to_string();
        let place = submission
            .clone()
            .into_place(id.clone(), Some(Utc::now()));
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::SeqCst) as u64;

        self.places.lock().await.push((seq, place));

        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn increment(&self, id: &str, counter: Counter, delta: u64) -> Result<(), Error> {
        self.increments
            .lock()
            .await
            .push((id.to_string(), counter, delta));
        self.check_available()?;

        let mut places = self.places.lock().await;
        let (_, place) = places
            .iter_mut()
            .find(|(_, place)| place.id == id)
            .ok_or_else(not_found_error)?;

        place.increment(counter, delta);

        Ok(())
    }
}

#[test]
fn memory_store_orders_newest_first_test() {
    use crate::entities::submission::test_submission;
    use tokio_test::block_on;

    let store = MemoryStore::new();

    let first = block_on(store.insert(&test_submission("first", &[]))).unwrap();
    let second = block_on(store.insert(&test_submission("second", &["lift"]))).unwrap();
    let third = block_on(store.insert(&test_submission("third", &[]))).unwrap();

    let places = block_on(store.fetch_all()).unwrap();
    let ids: Vec<String> = places.iter().map(|p| p.id.clone()).collect();

    assert_eq!(ids, vec![third, second, first]);
    assert!(places.iter().all(|p| p.created_at.is_some() && !p.is_demo()));
}

#[test]
fn memory_store_increment_test() {
    use crate::entities::submission::test_submission;
    use tokio_test::block_on;

    let store = MemoryStore::new();
    let id = block_on(store.insert(&test_submission("cafe", &[]))).unwrap();

    block_on(store.increment(&id, Counter::Confirmations, 1)).unwrap();
    block_on(store.increment(&id, Counter::Confirmations, 1)).unwrap();
    block_on(store.increment(&id, Counter::Reports, 1)).unwrap();

    let place = block_on(store.get(&id)).unwrap();
    assert_eq!(place.confirmations, 2);
    assert_eq!(place.reports, 1);

    let err = block_on(store.increment("missing", Counter::Reports, 1)).unwrap_err();
    assert!(err.is_not_found_error());
    assert_eq!(block_on(store.increment_calls()).len(), 4);
}

#[test]
fn memory_store_failing_test() {
    use crate::entities::submission::test_submission;
    use tokio_test::block_on;

    let store = MemoryStore::new();
    store.set_failing(true);

    assert!(block_on(store.fetch_all()).is_err());
    assert!(block_on(store.insert(&test_submission("cafe", &[]))).is_err());
    assert_eq!(store.fetch_count(), 1);
    assert_eq!(store.insert_count(), 1);

    store.set_failing(false);
    assert!(block_on(store.fetch_all())
        .unwrap()
        .is_empty());
}
