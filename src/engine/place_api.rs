use super::{CacheSource, Engine, SUBMITTED, SUBMIT_FAILED};

use async_trait::async_trait;

use crate::{
    api::{ActionOutcome, ActionRequest, PlaceAPI},
    entities::{Counter, NewPlace, Notice},
    error::{not_found_error, Error},
    external::google_maps,
    filter::FeatureFilter,
    view::{render, ActionKind, ListView, REPORT_PROMPT},
};

#[cfg(test)]
use crate::store::PlaceStore;

#[async_trait]
impl PlaceAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn load_places(&self) -> CacheSource {
        let source = self.reload().await;

        tracing::info!("place list filled from {:?}", source);

        source
    }

    #[tracing::instrument(skip(self))]
    async fn list_places(&self, filter: &FeatureFilter) -> ListView {
        render(self.cache.lock().await.places(), filter)
    }

    #[tracing::instrument(skip(self))]
    async fn submit_place(&self, place: NewPlace) -> Result<Notice, Error> {
        let submission = place.validate()?;

        match self.store.insert(&submission).await {
            Ok(id) => {
                tracing::info!("added place {}", id);
                self.reload().await;

                Ok(Notice::success(SUBMITTED))
            }
            Err(err) => {
                tracing::error!("error adding place: {}", err);

                Ok(Notice::alert(SUBMIT_FAILED))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn confirm_place(&self, id: &str) -> Notice {
        self.bump(id, Counter::Confirmations).await
    }

    #[tracing::instrument(skip(self))]
    async fn report_place(&self, id: &str) -> Notice {
        self.bump(id, Counter::Reports).await
    }

    #[tracing::instrument(skip(self))]
    async fn dispatch(&self, id: &str, request: ActionRequest) -> Result<ActionOutcome, Error> {
        match request.kind {
            ActionKind::ViewOnMap => {
                let address = self
                    .cache
                    .lock()
                    .await
                    .find(id)
                    .map(|place| place.address.clone())
                    .ok_or_else(not_found_error)?;
                let url = google_maps::search_url(&address)?;

                Ok(ActionOutcome::Open {
                    url: url.to_string(),
                })
            }
            ActionKind::Confirm => Ok(ActionOutcome::Notice(self.confirm_place(id).await)),
            ActionKind::Report if !request.confirmed => Ok(ActionOutcome::Prompt {
                message: REPORT_PROMPT.into(),
            }),
            ActionKind::Report => Ok(ActionOutcome::Notice(self.report_place(id).await)),
        }
    }
}

#[cfg(test)]
fn engine_with_store() -> (Engine, std::sync::Arc<crate::store::MemoryStore>) {
    let store = std::sync::Arc::new(crate::store::MemoryStore::new());
    let engine = Engine::new(store.clone());

    (engine, store)
}

#[cfg(test)]
fn cards_of(view: ListView) -> Vec<crate::view::PlaceCard> {
    match view {
        ListView::Cards { cards } => cards,
        other => panic!("unexpected view: {:?}", other),
    }
}

#[cfg(test)]
fn listed(engine: &Engine) -> Vec<crate::view::PlaceCard> {
    cards_of(tokio_test::block_on(engine.list_places(&FeatureFilter::new())))
}

/// Holds every increment until the test opens the gate.
#[cfg(test)]
struct GatedStore {
    inner: crate::store::MemoryStore,
    gate: tokio::sync::Notify,
}

#[cfg(test)]
#[async_trait]
impl PlaceStore for GatedStore {
    async fn fetch_all(&self) -> Result<Vec<crate::entities::Place>, Error> {
        self.inner.fetch_all().await
    }

    async fn insert(&self, submission: &crate::entities::Submission) -> Result<String, Error> {
        self.inner.insert(submission).await
    }

    async fn increment(&self, id: &str, counter: Counter, delta: u64) -> Result<(), Error> {
        self.gate.notified().await;
        self.inner.increment(id, counter, delta).await
    }
}

#[test]
fn load_empty_store_shows_demo_places_test() {
    use tokio_test::block_on;

    let (engine, _) = engine_with_store();

    assert_eq!(block_on(engine.load_places()), CacheSource::Demo);

    let cards = listed(&engine);
    let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();

    assert_eq!(ids, vec!["demo-1", "demo-2", "demo-3", "demo-4"]);
    assert!(cards.iter().all(|c| c.is_demo));
}

#[test]
fn load_failure_falls_back_to_demo_test() {
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();
    store.set_failing(true);

    assert_eq!(block_on(engine.load_places()), CacheSource::Demo);
    assert_eq!(listed(&engine).len(), 4);
}

#[test]
fn confirm_demo_place_twice_stays_local_test() {
    use crate::entities::NoticeKind;
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();
    block_on(engine.load_places());
    let fetches = store.fetch_count();

    let first = block_on(engine.confirm_place("demo-3"));
    let second = block_on(engine.confirm_place("demo-3"));

    assert_eq!(first.kind, NoticeKind::Success);
    assert_eq!(second.message, super::CONFIRMED_DEMO);

    let cards = listed(&engine);
    assert_eq!(cards[2].id, "demo-3");
    assert_eq!(cards[2].confirmations, 3);

    assert!(block_on(store.increment_calls()).is_empty());
    assert_eq!(store.fetch_count(), fetches);

    // the next load discards local changes
    block_on(engine.load_places());
    assert_eq!(listed(&engine)[2].confirmations, 1);
}

#[test]
fn confirm_remote_place_increments_once_and_reloads_test() {
    use crate::entities::submission::test_submission;
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();
    let id = block_on(store.insert(&test_submission("Cafe", &["lift"]))).unwrap();
    block_on(engine.load_places());
    let fetches = store.fetch_count();

    let notice = block_on(engine.confirm_place(&id));

    assert_eq!(notice, Notice::success(super::CONFIRMED));
    assert_eq!(
        block_on(store.increment_calls()),
        vec![(id.clone(), Counter::Confirmations, 1)]
    );
    assert_eq!(store.fetch_count(), fetches + 1);
    assert_eq!(listed(&engine)[0].confirmations, 1);
}

#[test]
fn report_remote_place_test() {
    use crate::entities::submission::test_submission;
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();
    let id = block_on(store.insert(&test_submission("Cafe", &[]))).unwrap();
    block_on(engine.load_places());

    let notice = block_on(engine.report_place(&id));

    assert_eq!(notice, Notice::success(super::REPORTED));
    assert_eq!(block_on(store.get(&id)).unwrap().reports, 1);
    assert_eq!(block_on(store.get(&id)).unwrap().confirmations, 0);
}

#[test]
fn report_demo_place_test() {
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();
    block_on(engine.load_places());

    let notice = block_on(engine.report_place("demo-1"));

    assert_eq!(notice, Notice::success(super::REPORTED_DEMO));
    assert!(block_on(store.increment_calls()).is_empty());
}

#[test]
fn failed_increment_alerts_without_retry_test() {
    use crate::entities::{submission::test_submission, NoticeKind};
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();
    let id = block_on(store.insert(&test_submission("Cafe", &[]))).unwrap();
    block_on(engine.load_places());
    store.set_failing(true);
    let fetches = store.fetch_count();

    let notice = block_on(engine.confirm_place(&id));

    assert_eq!(notice.kind, NoticeKind::Alert);
    assert_eq!(notice.message, super::CONFIRM_FAILED);
    assert_eq!(notice.dismiss_after_secs, None);
    assert_eq!(block_on(store.increment_calls()).len(), 1);
    assert_eq!(store.fetch_count(), fetches);

    let notice = block_on(engine.report_place(&id));
    assert_eq!(notice, Notice::alert(super::REPORT_FAILED));
}

#[test]
fn confirm_unknown_place_goes_to_store_test() {
    use crate::entities::NoticeKind;
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();
    block_on(engine.load_places());

    let notice = block_on(engine.confirm_place("no-such-place"));

    assert_eq!(notice.kind, NoticeKind::Alert);
    assert_eq!(
        block_on(store.increment_calls()),
        vec![("no-such-place".to_string(), Counter::Confirmations, 1)]
    );
}

#[test]
fn submit_place_test() {
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();
    block_on(engine.load_places());

    let notice = block_on(engine.submit_place(NewPlace {
        name: "Lecture Hall 5".into(),
        place_type: "Classroom".into(),
        address: "Academic Block, Hall 5".into(),
        notes: "".into(),
        features: vec!["step_free".into(), "wheelchair".into()],
    }))
    .unwrap();

    assert_eq!(notice, Notice::success(SUBMITTED));
    assert_eq!(store.insert_count(), 1);

    let cards = listed(&engine);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "Lecture Hall 5");
    assert_eq!(cards[0].confirmations, 0);
    assert!(!cards[0].is_demo);
}

#[test]
fn submit_invalid_place_writes_nothing_test() {
    use crate::entities::REQUIRED_FIELDS_MESSAGE;
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();

    let err = block_on(engine.submit_place(NewPlace {
        name: "Cafe".into(),
        place_type: "Office".into(),
        address: "  ".into(),
        ..NewPlace::default()
    }))
    .unwrap_err();

    assert!(err.is_validation_error());
    assert_eq!(err.message, REQUIRED_FIELDS_MESSAGE);
    assert_eq!(store.insert_count(), 0);
    assert_eq!(store.fetch_count(), 0);
}

#[test]
fn submit_store_failure_alerts_test() {
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();
    store.set_failing(true);

    let notice = block_on(engine.submit_place(NewPlace {
        name: "Cafe".into(),
        place_type: "Office".into(),
        address: "Main Road".into(),
        ..NewPlace::default()
    }))
    .unwrap();

    assert_eq!(notice, Notice::alert(SUBMIT_FAILED));
}

#[test]
fn dispatch_report_requires_acknowledgement_test() {
    use tokio_test::block_on;

    let (engine, store) = engine_with_store();
    block_on(engine.load_places());

    let outcome = block_on(engine.dispatch(
        "demo-2",
        ActionRequest {
            kind: ActionKind::Report,
            confirmed: false,
        },
    ))
    .unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::Prompt {
            message: REPORT_PROMPT.into()
        }
    );
    assert!(block_on(store.increment_calls()).is_empty());

    let outcome = block_on(engine.dispatch(
        "demo-2",
        ActionRequest {
            kind: ActionKind::Report,
            confirmed: true,
        },
    ))
    .unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::Notice(Notice::success(super::REPORTED_DEMO))
    );
}

#[test]
fn dispatch_view_on_map_test() {
    use tokio_test::block_on;

    let (engine, _) = engine_with_store();
    block_on(engine.load_places());

    let outcome = block_on(engine.dispatch(
        "demo-4",
        ActionRequest {
            kind: ActionKind::ViewOnMap,
            confirmed: false,
        },
    ))
    .unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::Open {
            url: "https://www.google.com/maps/search/Academic%20Block%2C%20Hall%203".into()
        }
    );

    let err = block_on(engine.dispatch(
        "missing",
        ActionRequest {
            kind: ActionKind::ViewOnMap,
            confirmed: false,
        },
    ))
    .unwrap_err();
    assert!(err.is_not_found_error());
}

#[test]
fn dispatch_confirm_test() {
    use tokio_test::block_on;

    let (engine, _) = engine_with_store();
    block_on(engine.load_places());

    let outcome = block_on(engine.dispatch(
        "demo-1",
        ActionRequest {
            kind: ActionKind::Confirm,
            confirmed: false,
        },
    ))
    .unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::Notice(Notice::success(super::CONFIRMED_DEMO))
    );
}

#[test]
fn listing_while_remote_confirm_in_flight_test() {
    use crate::entities::submission::test_submission;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::block_on;

    let store = Arc::new(GatedStore {
        inner: MemoryStore::new(),
        gate: tokio::sync::Notify::new(),
    });
    let id = block_on(store.insert(&test_submission("Cafe", &["lift"]))).unwrap();
    let engine = Engine::new(store.clone());
    block_on(engine.load_places());

    let (notice, during) = block_on(async {
        let browse = async {
            let view = tokio::time::timeout(
                Duration::from_secs(1),
                engine.list_places(&FeatureFilter::new()),
            )
            .await;
            store.gate.notify_one();
            view
        };

        futures::join!(engine.confirm_place(&id), browse)
    });

    let during = cards_of(during.expect("listing waited for the store"));
    assert_eq!(during[0].confirmations, 0);

    assert_eq!(notice, Notice::success(super::CONFIRMED));
    assert_eq!(listed(&engine)[0].confirmations, 1);
}

#[test]
fn viewers_filter_independently_test() {
    use crate::entities::Feature;
    use tokio_test::block_on;

    let (engine, _) = engine_with_store();
    block_on(engine.load_places());

    let step_free = FeatureFilter::with([Feature::StepFree]);
    let ids: Vec<String> = cards_of(block_on(engine.list_places(&step_free)))
        .into_iter()
        .map(|card| card.id)
        .collect();
    assert_eq!(ids, vec!["demo-1", "demo-4"]);

    assert_eq!(listed(&engine).len(), 4);

    let none = FeatureFilter::with([Feature::Wheelchair, Feature::Restroom, Feature::Lift]);
    assert!(matches!(
        block_on(engine.list_places(&none)),
        ListView::NoMatches { .. }
    ));
}
