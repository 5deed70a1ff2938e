use axum::extract::{Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};

use crate::api::{ActionOutcome, ActionRequest};
use crate::engine::CacheSource;
use crate::entities::{NewPlace, Notice};
use crate::error::Error;
use crate::server::handlers::filters::FilterParams;
use crate::server::DynAPI;
use crate::view::ListView;

#[derive(Serialize, Deserialize)]
pub struct ReloadResult {
    source: CacheSource,
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<FilterParams>,
) -> Result<Json<ListView>, Error> {
    let filter = params.filter()?;

    Ok(api.list_places(&filter).await.into())
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<NewPlace>,
) -> Result<Json<Notice>, Error> {
    let notice = api.submit_place(params).await?;

    Ok(notice.into())
}

pub async fn reload(Extension(api): Extension<DynAPI>) -> Json<ReloadResult> {
    let source = api.load_places().await;

    ReloadResult { source }.into()
}

pub async fn dispatch(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<String>,
    Json(params): Json<ActionRequest>,
) -> Result<Json<ActionOutcome>, Error> {
    let outcome = api.dispatch(&id, params).await?;

    Ok(outcome.into())
}
