use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgPoolOptions, types::Json, Executor, Pool, Postgres, Row};
use uuid::Uuid;

use super::PlaceStore;
use crate::{
    entities::{Counter, Persistence, Place, PlaceType, Submission},
    error::{invalid_input_error, not_found_error, Error},
};

type Database = Postgres;

/// Document body kept in the `data` column; counters and the creation
/// timestamp live in their own columns so the database can order and
/// increment them.
#[derive(Debug, Serialize, Deserialize)]
struct PlaceData {
    name: String,
    place_type: PlaceType,
    address: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    features: Vec<String>,
}

#[derive(Debug)]
pub struct PgStore {
    pool: Pool<Database>,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::new", skip_all)]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        pool.execute(
            "CREATE TABLE IF NOT EXISTS places (id VARCHAR PRIMARY KEY, created_at TIMESTAMPTZ NOT NULL DEFAULT now(), confirmations INT8 NOT NULL DEFAULT 0, reports INT8 NOT NULL DEFAULT 0, data JSONB NOT NULL)",
        )
        .await?;
        pool.execute("CREATE INDEX IF NOT EXISTS places_created_at_idx ON places (created_at)")
            .await?;

        Ok(Self { pool })
    }
}

const SELECT_NEWEST_FIRST: &str =
    "SELECT id, created_at, confirmations, reports, data FROM places ORDER BY created_at DESC";

fn increment_query(counter: Counter) -> &'static str {
    match counter {
        Counter::Confirmations => {
            "UPDATE places SET confirmations = confirmations + $2 WHERE id = $1"
        }
        Counter::Reports => "UPDATE places SET reports = reports + $2 WHERE id = $1",
    }
}

#[async_trait]
impl PlaceStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Place>, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut results = conn.fetch(sqlx::query(SELECT_NEWEST_FIRST));

        let mut places = Vec::new();

        while let Some(row) = results.try_next().await? {
            let id: String = row.try_get("id")?;
            let created_at: DateTime<Utc> = row.try_get("created_at")?;
            let confirmations: i64 = row.try_get("confirmations")?;
            let reports: i64 = row.try_get("reports")?;
            let Json(data): Json<PlaceData> = row.try_get("data")?;

            places.push(Place {
                id,
                name: data.name,
                place_type: data.place_type,
                address: data.address,
                notes: data.notes,
                features: data.features,
                confirmations: confirmations.max(0) as u64,
                reports: reports.max(0) as u64,
                created_at: Some(created_at),
                persistence: Persistence::Remote,
            });
        }

        Ok(places)
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, submission: &Submission) -> Result<String, Error> {
        let id = Uuid::new_v4().to_string();
        let data = PlaceData {
            name: submission.name.clone(),
            place_type: submission.place_type,
            address: submission.address.clone(),
            notes: submission.notes.clone(),
            features: submission.features.clone(),
        };

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO places (id, created_at, confirmations, reports, data) VALUES ($1, now(), 0, 0, $2)",
            )
            .bind(&id)
            .bind(Json(&data)),
        )
        .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn increment(&self, id: &str, counter: Counter, delta: u64) -> Result<(), Error> {
        let delta = i64::try_from(delta).map_err(|_| invalid_input_error())?;

        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(sqlx::query(increment_query(counter)).bind(id).bind(delta))
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error());
        }

        Ok(())
    }
}

#[test]
fn select_query_test() {
    assert!(SELECT_NEWEST_FIRST.ends_with("ORDER BY created_at DESC"));
}

#[test]
fn increment_query_test() {
    assert!(increment_query(Counter::Confirmations).contains("confirmations = confirmations + $2"));
    assert!(increment_query(Counter::Reports).contains("reports = reports + $2"));
}
