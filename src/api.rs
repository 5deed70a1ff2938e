use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engine::CacheSource;
use crate::entities::{NewPlace, Notice};
use crate::error::Error;
use crate::filter::FeatureFilter;
use crate::view::{ActionKind, ListView};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionRequest {
    pub kind: ActionKind,
    /// Set once the user accepted the action's prompt, if it has one.
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Open { url: String },
    Prompt { message: String },
    Notice(Notice),
}

#[async_trait]
pub trait PlaceAPI {
    async fn load_places(&self) -> CacheSource;
    /// The cached places as seen through one viewer's filter.
    async fn list_places(&self, filter: &FeatureFilter) -> ListView;
    async fn submit_place(&self, place: NewPlace) -> Result<Notice, Error>;
    async fn confirm_place(&self, id: &str) -> Notice;
    async fn report_place(&self, id: &str) -> Notice;
    async fn dispatch(&self, id: &str, request: ActionRequest) -> Result<ActionOutcome, Error>;
}
