mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::PlaceAPI;
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{features, filters, places};

pub(crate) type DynAPI = Arc<dyn PlaceAPI + Send + Sync>;

pub fn router<T: PlaceAPI + Sync + Send + 'static>(api: T) -> Router {
    let api = Arc::new(api) as DynAPI;

    Router::new()
        .route("/places", get(places::list).post(places::create))
        .route("/places/reload", post(places::reload))
        .route("/places/:id/actions", post(places::dispatch))
        .route("/filters/:feature", patch(filters::toggle))
        .route("/features", get(features::list))
        .layer(Extension(api))
}

pub async fn serve<T: PlaceAPI + Sync + Send + 'static>(
    api: T,
    addr: SocketAddr,
) -> Result<(), Error> {
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|err| {
            tracing::error!("server error: {}", err);
            unexpected_error()
        })
}

#[cfg(test)]
fn loaded_router() -> Router {
    use crate::engine::Engine;
    use crate::store::MemoryStore;

    let engine = Engine::new(Arc::new(MemoryStore::new()));
    tokio_test::block_on(engine.load_places());

    router(engine)
}

#[cfg(test)]
fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => Request::builder().method(method).uri(uri).body(Body::empty()),
    }
    .unwrap();

    tokio_test::block_on(async {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    })
}

#[test]
fn list_places_filters_per_request_test() {
    use axum::http::StatusCode;

    let app = loaded_router();

    let (status, body) = send(app.clone(), "GET", "/places?features=step_free", None);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "cards");
    assert_eq!(body["cards"].as_array().unwrap().len(), 2);
    assert_eq!(body["cards"][0]["id"], "demo-1");
    assert_eq!(body["cards"][1]["id"], "demo-4");

    let (status, body) = send(app, "GET", "/places", None);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cards"].as_array().unwrap().len(), 4);
}

#[test]
fn unknown_feature_is_rejected_test() {
    use axum::http::StatusCode;

    let app = loaded_router();

    let (status, body) = send(app.clone(), "PATCH", "/filters/teleporter", None);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown accessibility feature: teleporter");

    let (status, _) = send(app, "GET", "/places?features=wheelchair,teleporter", None);
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test]
fn toggle_filter_echoes_new_set_test() {
    use axum::http::StatusCode;

    let app = loaded_router();

    let (status, body) = send(app.clone(), "PATCH", "/filters/lift?features=wheelchair", None);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["wheelchair", "lift"]));

    let (_, body) = send(app, "PATCH", "/filters/lift?features=wheelchair,lift", None);
    assert_eq!(body, serde_json::json!(["wheelchair"]));
}

#[test]
fn create_place_validation_error_test() {
    use axum::http::StatusCode;
    use serde_json::json;

    let app = loaded_router();

    let (status, body) = send(
        app.clone(),
        "POST",
        "/places",
        Some(json!({ "name": "Cafe", "place_type": "Office", "address": " " })),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 101);
    assert_eq!(body["error"], "Please fill required fields.");

    let (status, body) = send(
        app,
        "POST",
        "/places",
        Some(json!({ "name": "Cafe", "place_type": "Office", "address": "Main Road" })),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "success");
}

#[test]
fn view_unknown_place_is_not_found_test() {
    use axum::http::StatusCode;
    use serde_json::json;

    let (status, body) = send(
        loaded_router(),
        "POST",
        "/places/missing/actions",
        Some(json!({ "kind": "view_on_map" })),
    );

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 102);
}

#[test]
fn features_marks_active_filters_test() {
    use axum::http::StatusCode;

    let (status, body) = send(loaded_router(), "GET", "/features?features=step_free", None);
    assert_eq!(status, StatusCode::OK);

    let features = body.as_array().unwrap();
    assert_eq!(features.len(), 5);
    assert_eq!(features[3]["tag"], "step_free");
    assert_eq!(features[3]["label"], "step free");
    assert_eq!(features[3]["active"], true);
    assert_eq!(features[0]["active"], false);
}
