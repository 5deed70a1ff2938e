use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{self, Assessment};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceType {
    #[serde(rename = "Public Area")]
    PublicArea,
    Office,
    Washroom,
    Classroom,
    #[serde(other)]
    Other,
}

impl PlaceType {
    pub const ALL: [PlaceType; 5] = [
        PlaceType::PublicArea,
        PlaceType::Office,
        PlaceType::Washroom,
        PlaceType::Classroom,
        PlaceType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::PublicArea => "Public Area",
            Self::Office => "Office",
            Self::Washroom => "Washroom",
            Self::Classroom => "Classroom",
            Self::Other => "Other",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.label() == label)
    }
}

/// Where counter mutations of a record go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    /// Lives only in the in-memory cache; lost on the next load.
    Local,
    Remote,
}

impl Default for Persistence {
    fn default() -> Self {
        Self::Remote
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Confirmations,
    Reports,
}

impl Counter {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Confirmations => "confirmations",
            Self::Reports => "reports",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub place_type: PlaceType,
    pub address: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub confirmations: u64,
    #[serde(default)]
    pub reports: u64,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub persistence: Persistence,
}

impl Place {
    pub fn is_demo(&self) -> bool {
        self.persistence == Persistence::Local
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn has_feature(&self, tag: &str) -> bool {
        self.features.iter().any(|f| f == tag)
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Confirmations => self.confirmations,
            Counter::Reports => self.reports,
        }
    }

    /// Counters only ever grow.
    pub fn increment(&mut self, counter: Counter, delta: u64) {
        match counter {
            Counter::Confirmations => {
                self.confirmations = self.confirmations.saturating_add(delta)
            }
            Counter::Reports => self.reports = self.reports.saturating_add(delta),
        }
    }

    pub fn assessment(&self) -> Assessment {
        scoring::assess(self.feature_count(), self.confirmations)
    }
}

/// Drops repeated tags, keeping the first occurrence.
pub fn dedup_features(features: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(features.len());

    for feature in features {
        if !unique.contains(&feature) {
            unique.push(feature);
        }
    }

    unique
}

#[cfg(test)]
pub(crate) fn test_place(id: &str, features: &[&str], confirmations: u64) -> Place {
    Place {
        id: id.into(),
        name: format!("Place {}", id),
        place_type: PlaceType::Office,
        address: "1 Test Street".into(),
        notes: "".into(),
        features: features.iter().map(|f| f.to_string()).collect(),
        confirmations,
        reports: 0,
        created_at: None,
        persistence: Persistence::Remote,
    }
}

#[test]
fn place_type_serde_test() {
    let json = serde_json::to_string(&PlaceType::PublicArea).unwrap();
    assert_eq!(json, "\"Public Area\"");

    let place_type: PlaceType = serde_json::from_str("\"Washroom\"").unwrap();
    assert_eq!(place_type, PlaceType::Washroom);

    let place_type: PlaceType = serde_json::from_str("\"Stadium\"").unwrap();
    assert_eq!(place_type, PlaceType::Other);
}

#[test]
fn place_type_parse_test() {
    assert_eq!(PlaceType::parse("Classroom"), Some(PlaceType::Classroom));
    assert_eq!(PlaceType::parse("Public Area"), Some(PlaceType::PublicArea));
    assert_eq!(PlaceType::parse("classroom"), None);
    assert_eq!(PlaceType::parse(""), None);
}

#[test]
fn place_defaults_test() {
    let place: Place = serde_json::from_value(serde_json::json!({
        "id": "abc",
        "name": "Cafe",
        "place_type": "Office",
        "address": "Main Road",
        "created_at": null,
    }))
    .unwrap();

    assert_eq!(place.confirmations, 0);
    assert_eq!(place.reports, 0);
    assert!(place.features.is_empty());
    assert_eq!(place.notes, "");
    assert_eq!(place.persistence, Persistence::Remote);
    assert!(!place.is_demo());
}

#[test]
fn place_increment_test() {
    let mut place = test_place("a", &["lift"], 2);

    place.increment(Counter::Confirmations, 1);
    place.increment(Counter::Reports, 3);

    assert_eq!(place.counter(Counter::Confirmations), 3);
    assert_eq!(place.counter(Counter::Reports), 3);

    place.confirmations = u64::MAX;
    place.increment(Counter::Confirmations, 1);
    assert_eq!(place.confirmations, u64::MAX);
}

#[test]
fn place_features_test() {
    let place = test_place("a", &["wheelchair", "restroom"], 0);

    assert_eq!(place.feature_count(), 2);
    assert!(place.has_feature("restroom"));
    assert!(!place.has_feature("lift"));
}

#[test]
fn dedup_features_test() {
    let features = dedup_features(vec![
        "lift".into(),
        "parking".into(),
        "lift".into(),
        "wheelchair".into(),
    ]);

    assert_eq!(features, vec!["lift", "parking", "wheelchair"]);
}
