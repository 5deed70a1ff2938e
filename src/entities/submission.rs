use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::place::dedup_features;
use crate::entities::{Feature, Persistence, Place, PlaceType};
use crate::error::{unknown_feature_error, validation_error, Error};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill required fields.";

/// Raw submission as it arrives from the form.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewPlace {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub place_type: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub features: Vec<String>,
}

/// A submission that passed validation and may be written.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Submission {
    pub name: String,
    pub place_type: PlaceType,
    pub address: String,
    pub notes: String,
    pub features: Vec<String>,
}

impl NewPlace {
    pub fn validate(self) -> Result<Submission, Error> {
        let name = self.name.trim();
        let place_type = self.place_type.trim();
        let address = self.address.trim();

        if name.is_empty() || place_type.is_empty() || address.is_empty() {
            return Err(validation_error(REQUIRED_FIELDS_MESSAGE));
        }

        let place_type = PlaceType::parse(place_type)
            .ok_or_else(|| validation_error("Please choose a place type from the list."))?;

        if let Some(unknown) = self.features.iter().find(|f| Feature::parse(f.as_str()).is_none()) {
            return Err(unknown_feature_error(unknown));
        }

        Ok(Submission {
            name: name.into(),
            place_type,
            address: address.into(),
            notes: self.notes.trim().into(),
            features: dedup_features(self.features),
        })
    }
}

impl Submission {
    /// Record as the store holds it right after insertion.
    pub fn into_place(self, id: String, created_at: Option<DateTime<Utc>>) -> Place {
        Place {
            id,
            name: self.name,
            place_type: self.place_type,
            address: self.address,
            notes: self.notes,
            features: self.features,
            confirmations: 0,
            reports: 0,
            created_at,
            persistence: Persistence::Remote,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_submission(name: &str, features: &[&str]) -> Submission {
    NewPlace {
        name: name.into(),
        place_type: "Office".into(),
        address: "Library Road".into(),
        notes: "".into(),
        features: features.iter().map(|f| f.to_string()).collect(),
    }
    .validate()
    .unwrap()
}

#[test]
fn validate_trims_fields_test() {
    let submission = NewPlace {
        name: "  Lecture Hall 3 ".into(),
        place_type: "Classroom".into(),
        address: " Academic Block ".into(),
        notes: "  side entrance  ".into(),
        features: vec!["step_free".into(), "step_free".into()],
    }
    .validate()
    .unwrap();

    assert_eq!(submission.name, "Lecture Hall 3");
    assert_eq!(submission.address, "Academic Block");
    assert_eq!(submission.notes, "side entrance");
    assert_eq!(submission.place_type, PlaceType::Classroom);
    assert_eq!(submission.features, vec!["step_free"]);
}

#[test]
fn validate_required_fields_test() {
    let valid = NewPlace {
        name: "Cafe".into(),
        place_type: "Office".into(),
        address: "Main Road".into(),
        ..NewPlace::default()
    };

    let missing_name = NewPlace {
        name: "   ".into(),
        ..valid.clone()
    };
    let missing_type = NewPlace {
        place_type: "".into(),
        ..valid.clone()
    };
    let missing_address = NewPlace {
        address: "".into(),
        ..valid.clone()
    };

    for submission in [missing_name, missing_type, missing_address] {
        let err = submission.validate().unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(err.message, REQUIRED_FIELDS_MESSAGE);
    }

    assert!(valid.validate().is_ok());
}

#[test]
fn validate_rejects_unknown_values_test() {
    let unknown_type = NewPlace {
        name: "Cafe".into(),
        place_type: "Spaceport".into(),
        address: "Main Road".into(),
        ..NewPlace::default()
    };
    assert!(unknown_type.validate().unwrap_err().is_validation_error());

    let unknown_feature = NewPlace {
        name: "Cafe".into(),
        place_type: "Office".into(),
        address: "Main Road".into(),
        features: vec!["lift".into(), "teleporter".into()],
        ..NewPlace::default()
    };
    let err = unknown_feature.validate().unwrap_err();
    assert!(err.is_validation_error());
    assert!(err.message.contains("teleporter"));
}

#[test]
fn into_place_starts_counters_at_zero_test() {
    let place = test_submission("Cafe", &["lift"]).into_place("id-1".into(), None);

    assert_eq!(place.id, "id-1");
    assert_eq!(place.confirmations, 0);
    assert_eq!(place.reports, 0);
    assert_eq!(place.persistence, Persistence::Remote);
}
