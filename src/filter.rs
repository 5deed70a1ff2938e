use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entities::{Feature, Place};
use crate::error::{unknown_feature_error, Error};

/// The set of features a visible place must all carry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFilter {
    active: BTreeSet<Feature>,
}

impl FeatureFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            active: features.into_iter().collect(),
        }
    }

    /// Reads a comma separated tag list such as `wheelchair,step_free`.
    /// Blank entries are skipped; unknown tags are rejected.
    pub fn parse_list(list: &str) -> Result<Self, Error> {
        let features = list
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(|tag| Feature::parse(tag).ok_or_else(|| unknown_feature_error(tag)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::with(features))
    }

    /// Adds the feature if absent, removes it otherwise. Returns whether it
    /// is active afterwards.
    pub fn toggle(&mut self, feature: Feature) -> bool {
        if self.active.remove(&feature) {
            false
        } else {
            self.active.insert(feature);
            true
        }
    }

    pub fn is_active(&self, feature: Feature) -> bool {
        self.active.contains(&feature)
    }

    pub fn active(&self) -> impl Iterator<Item = Feature> + '_ {
        self.active.iter().copied()
    }

    pub fn matches(&self, place: &Place) -> bool {
        self.active.iter().all(|f| place.has_feature(f.name()))
    }

    /// Places carrying every active feature, in their original order.
    pub fn apply<'a>(&self, places: &'a [Place]) -> Vec<&'a Place> {
        places.iter().filter(|place| self.matches(place)).collect()
    }
}

#[cfg(test)]
fn sample_places() -> Vec<Place> {
    use crate::entities::place::test_place;

    vec![
        test_place("a", &["wheelchair", "restroom", "step_free"], 4),
        test_place("b", &["lift", "wheelchair", "parking"], 6),
        test_place("c", &["restroom"], 1),
        test_place("d", &[], 0),
        test_place("e", &["restroom", "wheelchair"], 0),
    ]
}

#[cfg(test)]
fn ids(places: &[&Place]) -> Vec<String> {
    places.iter().map(|p| p.id.clone()).collect()
}

#[test]
fn empty_filter_matches_everything_in_order_test() {
    let places = sample_places();
    let filter = FeatureFilter::new();

    assert_eq!(ids(&filter.apply(&places)), vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn filter_uses_and_semantics_test() {
    let places = sample_places();
    let filter = FeatureFilter::with([Feature::Wheelchair, Feature::Restroom]);

    assert_eq!(ids(&filter.apply(&places)), vec!["a", "e"]);

    let filter = FeatureFilter::with([Feature::Lift]);
    assert_eq!(ids(&filter.apply(&places)), vec!["b"]);

    let filter = FeatureFilter::with([Feature::Lift, Feature::Restroom]);
    assert!(filter.apply(&places).is_empty());
}

#[test]
fn filter_on_empty_cache_test() {
    let filter = FeatureFilter::with([Feature::Parking]);

    assert!(filter.apply(&[]).is_empty());
}

#[test]
fn toggle_test() {
    let mut filter = FeatureFilter::new();

    assert!(filter.toggle(Feature::Parking));
    assert!(filter.is_active(Feature::Parking));
    assert!(filter.toggle(Feature::Lift));
    assert_eq!(
        filter.active().collect::<Vec<_>>(),
        vec![Feature::Lift, Feature::Parking]
    );

    assert!(!filter.toggle(Feature::Parking));
    assert!(!filter.is_active(Feature::Parking));
    assert!(!filter.toggle(Feature::Lift));
    assert_eq!(filter.active().next(), None);
}

#[test]
fn toggle_reevaluates_without_state_test() {
    let places = sample_places();
    let mut filter = FeatureFilter::new();

    filter.toggle(Feature::Restroom);
    assert_eq!(ids(&filter.apply(&places)), vec!["a", "c", "e"]);

    filter.toggle(Feature::Wheelchair);
    assert_eq!(ids(&filter.apply(&places)), vec!["a", "e"]);

    filter.toggle(Feature::Restroom);
    assert_eq!(ids(&filter.apply(&places)), vec!["a", "b", "e"]);
}

#[test]
fn parse_list_test() {
    assert_eq!(FeatureFilter::parse_list("").unwrap(), FeatureFilter::new());
    assert_eq!(
        FeatureFilter::parse_list("step_free, wheelchair,,step_free").unwrap(),
        FeatureFilter::with([Feature::Wheelchair, Feature::StepFree])
    );

    let err = FeatureFilter::parse_list("lift,teleporter").unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(err.message, "Unknown accessibility feature: teleporter");
}
