use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::{
    config::FirestoreConfig,
    entities::{Counter, Persistence, Place, PlaceType, Submission},
    error::{invalid_input_error, not_found_error, upstream_error, Error},
    store::PlaceStore,
};

/// Places kept as documents in a Firestore collection, reached over the
/// REST API.
#[derive(Clone, Debug)]
pub struct FirestoreStore {
    client: reqwest::Client,
    config: FirestoreConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RunQueryResult {
    document: Option<Document>,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "https://{}/v1/projects/{}/databases/(default)/documents",
            self.config.api_base, self.config.project_id
        )
    }

    fn document_name(&self, id: &str) -> String {
        format!(
            "projects/{}/databases/(default)/documents/{}/{}",
            self.config.project_id, self.config.collection, id
        )
    }

    #[tracing::instrument(skip(self, body))]
    async fn post(&self, url: String, body: Value) -> Result<reqwest::Response, Error> {
        let mut req = self.client.post(url).json(&body);

        if let Some(key) = &self.config.api_key {
            req = req.query(&[("key", key)]);
        }

        let res = req.send().await?;
        let status_code = res.status().as_u16();

        if status_code == 404 {
            return Err(not_found_error());
        } else if status_code >= 400 && status_code < 500 {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        Ok(res)
    }
}

#[async_trait]
impl PlaceStore for FirestoreStore {
    #[tracing::instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Place>, Error> {
        let url = format!("{}:runQuery", self.documents_url());
        let res = self
            .post(url, run_query_body(&self.config.collection))
            .await?;

        let results: Vec<RunQueryResult> = res.json().await?;

        results
            .into_iter()
            .filter_map(|result| result.document)
            .map(|document| decode_document(&document))
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, submission: &Submission) -> Result<String, Error> {
        let id = Uuid::new_v4().simple().to_string();
        let url = format!("{}:commit", self.documents_url());

        self.post(url, insert_body(&self.document_name(&id), submission))
            .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn increment(&self, id: &str, counter: Counter, delta: u64) -> Result<(), Error> {
        let url = format!("{}:commit", self.documents_url());

        self.post(url, increment_body(&self.document_name(id), counter, delta))
            .await
            .map_err(|err| {
                // a missing document fails the exists precondition
                if err.code == invalid_input_error().code {
                    not_found_error()
                } else {
                    err
                }
            })?;

        Ok(())
    }
}

fn run_query_body(collection: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "orderBy": [{
                "field": { "fieldPath": "createdAt" },
                "direction": "DESCENDING",
            }],
        }
    })
}

fn insert_body(document_name: &str, submission: &Submission) -> Value {
    let features: Vec<Value> = submission
        .features
        .iter()
        .map(|f| json!({ "stringValue": f }))
        .collect();

    json!({
        "writes": [{
            "update": {
                "name": document_name,
                "fields": {
                    "placeName": { "stringValue": submission.name },
                    "placeType": { "stringValue": submission.place_type.label() },
                    "address": { "stringValue": submission.address },
                    "notes": { "stringValue": submission.notes },
                    "features": { "arrayValue": { "values": features } },
                    "confirmations": { "integerValue": "0" },
                    "reports": { "integerValue": "0" },
                },
            },
            "updateTransforms": [{
                "fieldPath": "createdAt",
                "setToServerValue": "REQUEST_TIME",
            }],
            "currentDocument": { "exists": false },
        }]
    })
}

fn increment_body(document_name: &str, counter: Counter, delta: u64) -> Value {
    json!({
        "writes": [{
            "transform": {
                "document": document_name,
                "fieldTransforms": [{
                    "fieldPath": counter.field_name(),
                    "increment": { "integerValue": delta.to_string() },
                }],
            },
            "currentDocument": { "exists": true },
        }]
    })
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(|v| v.get("stringValue"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn integer_field(fields: &Map<String, Value>, key: &str) -> u64 {
    match fields.get(key).and_then(|v| v.get("integerValue")) {
        Some(Value::String(s)) => s.parse::<i64>().map(|n| n.max(0) as u64).unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

fn timestamp_field(fields: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    fields
        .get(key)
        .and_then(|v| v.get("timestampValue"))
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn string_array_field(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(|v| v.get("arrayValue"))
        .and_then(|v| v.get("values"))
        .and_then(|v| v.as_array())
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.get("stringValue").and_then(|s| s.as_str()))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn decode_document(document: &Document) -> Result<Place, Error> {
    let id = document
        .name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| upstream_error())?
        .to_string();

    let fields = &document.fields;
    let place_type = string_field(fields, "placeType")
        .and_then(|t| PlaceType::parse(&t))
        .unwrap_or(PlaceType::Other);

    Ok(Place {
        id,
        name: string_field(fields, "placeName").unwrap_or_default(),
        place_type,
        address: string_field(fields, "address").unwrap_or_default(),
        notes: string_field(fields, "notes").unwrap_or_default(),
        features: string_array_field(fields, "features"),
        confirmations: integer_field(fields, "confirmations"),
        reports: integer_field(fields, "reports"),
        created_at: timestamp_field(fields, "createdAt"),
        persistence: Persistence::Remote,
    })
}

#[cfg(test)]
fn test_store() -> FirestoreStore {
    FirestoreStore::new(FirestoreConfig {
        api_base: "firestore.googleapis.com".into(),
        project_id: "campus-access".into(),
        api_key: None,
        collection: "accessible_places".into(),
    })
}

#[test]
fn urls_test() {
    let store = test_store();

    assert_eq!(
        store.documents_url(),
        "https://firestore.googleapis.com/v1/projects/campus-access/databases/(default)/documents"
    );
    assert_eq!(
        store.document_name("abc"),
        "projects/campus-access/databases/(default)/documents/accessible_places/abc"
    );
}

#[test]
fn run_query_body_test() {
    let body = run_query_body("accessible_places");

    assert_eq!(
        body["structuredQuery"]["from"][0]["collectionId"],
        "accessible_places"
    );
    assert_eq!(
        body["structuredQuery"]["orderBy"][0]["field"]["fieldPath"],
        "createdAt"
    );
    assert_eq!(
        body["structuredQuery"]["orderBy"][0]["direction"],
        "DESCENDING"
    );
}

#[test]
fn insert_body_test() {
    use crate::entities::submission::test_submission;

    let submission = test_submission("Green Leaf Cafeteria", &["wheelchair", "restroom"]);
    let body = insert_body("projects/p/databases/(default)/documents/c/id", &submission);
    let write = &body["writes"][0];
    let fields = &write["update"]["fields"];

    assert_eq!(fields["placeName"]["stringValue"], "Green Leaf Cafeteria");
    assert_eq!(fields["placeType"]["stringValue"], "Office");
    assert_eq!(fields["confirmations"]["integerValue"], "0");
    assert_eq!(
        fields["features"]["arrayValue"]["values"][1]["stringValue"],
        "restroom"
    );
    assert_eq!(write["updateTransforms"][0]["setToServerValue"], "REQUEST_TIME");
    assert_eq!(write["currentDocument"]["exists"], false);
}

#[test]
fn increment_body_test() {
    let body = increment_body("projects/p/databases/(default)/documents/c/id", Counter::Reports, 1);
    let transform = &body["writes"][0]["transform"];

    assert_eq!(transform["fieldTransforms"][0]["fieldPath"], "reports");
    assert_eq!(
        transform["fieldTransforms"][0]["increment"]["integerValue"],
        "1"
    );
    assert_eq!(body["writes"][0]["currentDocument"]["exists"], true);
}

#[test]
fn decode_document_test() {
    let document: Document = serde_json::from_value(json!({
        "name": "projects/p/databases/(default)/documents/accessible_places/xyz",
        "fields": {
            "placeName": { "stringValue": "Lecture Hall 3" },
            "placeType": { "stringValue": "Classroom" },
            "address": { "stringValue": "Academic Block, Hall 3" },
            "features": { "arrayValue": { "values": [{ "stringValue": "step_free" }] } },
            "confirmations": { "integerValue": "2" },
            "createdAt": { "timestampValue": "2025-07-15T10:30:00.123456Z" },
        },
        "createTime": "2025-07-15T10:30:00.123456Z",
    }))
    .unwrap();

    let place = decode_document(&document).unwrap();

    assert_eq!(place.id, "xyz");
    assert_eq!(place.name, "Lecture Hall 3");
    assert_eq!(place.place_type, PlaceType::Classroom);
    assert_eq!(place.features, vec!["step_free"]);
    assert_eq!(place.confirmations, 2);
    assert_eq!(place.reports, 0);
    assert_eq!(place.notes, "");
    assert!(place.created_at.is_some());
    assert!(!place.is_demo());
}

#[test]
fn decode_document_missing_fields_test() {
    let document: Document = serde_json::from_value(json!({
        "name": "projects/p/databases/(default)/documents/accessible_places/pending",
        "fields": {
            "placeName": { "stringValue": "Cafe" },
            "placeType": { "stringValue": "Food Court" },
            "features": { "arrayValue": {} },
        },
    }))
    .unwrap();

    let place = decode_document(&document).unwrap();

    assert_eq!(place.place_type, PlaceType::Other);
    assert!(place.features.is_empty());
    assert!(place.created_at.is_none());
}
