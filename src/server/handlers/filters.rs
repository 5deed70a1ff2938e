use axum::extract::{Json, Path, Query};
use serde::Deserialize;

use crate::entities::Feature;
use crate::error::{unknown_feature_error, Error};
use crate::filter::FeatureFilter;

/// The viewer's active filter, carried on the query string as
/// `?features=wheelchair,lift`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    features: String,
}

impl FilterParams {
    pub fn filter(&self) -> Result<FeatureFilter, Error> {
        FeatureFilter::parse_list(&self.features)
    }
}

pub async fn toggle(
    Path(tag): Path<String>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<Feature>>, Error> {
    let feature = Feature::parse(&tag).ok_or_else(|| unknown_feature_error(&tag))?;

    let mut filter = params.filter()?;
    filter.toggle(feature);

    Ok(filter.active().collect::<Vec<_>>().into())
}
