pub mod memory;
pub mod pg;

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    config::{Config, StoreBackend},
    entities::{Counter, Place, Submission},
    error::Error,
    external::firestore::FirestoreStore,
};

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Remote document collection holding the places.
///
/// Stores own ordering, id and timestamp assignment, and counter atomicity:
/// `increment` must be race-free without a prior read.
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// Every place, newest first.
    async fn fetch_all(&self) -> Result<Vec<Place>, Error>;

    /// Returns the id the store assigned.
    async fn insert(&self, submission: &Submission) -> Result<String, Error>;

    /// Fails with a not-found error when no record has this id.
    async fn increment(&self, id: &str, counter: Counter, delta: u64) -> Result<(), Error>;
}

pub type DynStore = Arc<dyn PlaceStore>;

#[tracing::instrument(skip(config))]
pub async fn connect(config: &Config) -> Result<DynStore, Error> {
    let store: DynStore = match &config.store {
        StoreBackend::Memory => {
            tracing::info!("using in-memory place store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres {
            url,
            max_connections,
        } => {
            tracing::info!("using postgres place store");
            Arc::new(PgStore::new(url, *max_connections).await?)
        }
        StoreBackend::Firestore(firestore) => {
            tracing::info!(
                "using firestore place store for project {}",
                firestore.project_id
            );
            Arc::new(FirestoreStore::new(firestore.clone()))
        }
    };

    Ok(store)
}
