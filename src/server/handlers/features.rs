use axum::extract::{Json, Query};
use serde::Serialize;

use crate::entities::{label_for, Feature};
use crate::error::Error;
use crate::server::handlers::filters::FilterParams;

#[derive(Serialize)]
pub struct FeatureInfo {
    tag: &'static str,
    icon: &'static str,
    label: String,
    active: bool,
}

/// The feature vocabulary, marked against the viewer's active filter.
pub async fn list(Query(params): Query<FilterParams>) -> Result<Json<Vec<FeatureInfo>>, Error> {
    let filter = params.filter()?;

    let features = Feature::ALL
        .iter()
        .map(|f| FeatureInfo {
            tag: f.name(),
            icon: f.icon(),
            label: label_for(f.name()),
            active: filter.is_active(*f),
        })
        .collect::<Vec<_>>();

    Ok(features.into())
}
