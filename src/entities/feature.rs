use serde::{Deserialize, Serialize};

/// Accessibility attributes a place can be tagged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Wheelchair,
    Restroom,
    Lift,
    StepFree,
    Parking,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Wheelchair,
        Feature::Restroom,
        Feature::Lift,
        Feature::StepFree,
        Feature::Parking,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Wheelchair => "wheelchair",
            Self::Restroom => "restroom",
            Self::Lift => "lift",
            Self::StepFree => "step_free",
            Self::Parking => "parking",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Wheelchair => "\u{267F}",
            Self::Restroom => "\u{1F6BB}",
            Self::Lift => "\u{1F6D7}",
            Self::StepFree => "\u{1F6AA}",
            Self::Parking => "\u{1F17F}\u{FE0F}",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == tag)
    }
}

/// Icon for a stored tag; tags outside the vocabulary get none.
pub fn icon_for(tag: &str) -> &'static str {
    Feature::parse(tag).map(|f| f.icon()).unwrap_or("")
}

/// Human label for a stored tag (first underscore becomes a space).
pub fn label_for(tag: &str) -> String {
    tag.replacen('_', " ", 1)
}

#[test]
fn feature_parse_test() {
    for feature in Feature::ALL {
        assert_eq!(Feature::parse(feature.name()), Some(feature));
    }

    assert_eq!(Feature::parse("escalator"), None);
    assert_eq!(Feature::parse("Wheelchair"), None);
}

#[test]
fn feature_badge_text_test() {
    assert_eq!(icon_for("wheelchair"), "\u{267F}");
    assert_eq!(icon_for("hearing_loop"), "");
    assert_eq!(label_for("step_free"), "step free");
    assert_eq!(label_for("a_b_c"), "a b_c");
    assert_eq!(label_for("lift"), "lift");
}

#[test]
fn feature_serde_test() {
    let json = serde_json::to_string(&Feature::StepFree).unwrap();
    assert_eq!(json, "\"step_free\"");

    let feature: Feature = serde_json::from_str("\"parking\"").unwrap();
    assert_eq!(feature, Feature::Parking);
}
