//! Declarative view model for the place list.
//!
//! `render` turns the cached places and the active filter into plain data;
//! the display layer only lays it out. Every user-supplied string is
//! HTML-escaped here so templates can insert it verbatim.

use serde::Serialize;

use crate::{
    entities::{icon_for, label_for, Place},
    external::google_maps,
    filter::FeatureFilter,
    scoring::{score_text, Confidence},
};

pub const EMPTY_MESSAGE: &str = "No accessible places yet. Be the first to add helpful details!";
pub const NO_MATCHES_MESSAGE: &str = "No places match selected filters.";
pub const NO_NOTES_PLACEHOLDER: &str = "No additional notes";
pub const RECENTLY: &str = "Recently";
pub const REPORT_PROMPT: &str = "Report an issue for this place? This will flag it for review.";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListView {
    Empty { message: String },
    NoMatches { message: String },
    Cards { cards: Vec<PlaceCard> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Badge {
    pub tag: String,
    pub icon: String,
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ViewOnMap,
    Confirm,
    Report,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CardAction {
    pub kind: ActionKind,
    pub label: String,
    /// Opened in a new tab instead of dispatched.
    pub href: Option<String>,
    /// Question the user must accept before dispatching.
    pub prompt: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlaceCard {
    pub id: String,
    pub name: String,
    pub place_type: String,
    pub address: String,
    pub notes: Option<String>,
    pub notes_placeholder: String,
    pub badges: Vec<Badge>,
    pub confidence: Confidence,
    pub confidence_label: String,
    pub confidence_class: String,
    pub score: f64,
    pub score_text: String,
    pub confirmations: u64,
    pub added: String,
    pub is_demo: bool,
    pub actions: Vec<CardAction>,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

pub fn badge(tag: &str) -> Badge {
    Badge {
        tag: escape_html(tag),
        icon: icon_for(tag).into(),
        label: escape_html(&label_for(tag)),
    }
}

pub fn card(place: &Place) -> PlaceCard {
    let assessment = place.assessment();

    let added = place
        .created_at
        .map(|t| t.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| RECENTLY.into());

    let notes = match place.notes.trim() {
        "" => None,
        notes => Some(escape_html(notes)),
    };

    let map_href = match google_maps::search_url(&place.address) {
        Ok(url) => Some(url.to_string()),
        Err(err) => {
            tracing::warn!("no map link for place {}: {}", place.id, err);
            None
        }
    };

    PlaceCard {
        id: place.id.clone(),
        name: escape_html(&place.name),
        place_type: escape_html(place.place_type.label()),
        address: escape_html(&place.address),
        notes,
        notes_placeholder: NO_NOTES_PLACEHOLDER.into(),
        badges: place.features.iter().map(|f| badge(f)).collect(),
        confidence: assessment.confidence,
        confidence_label: assessment.confidence.label().into(),
        confidence_class: assessment.confidence.css_class().into(),
        score: assessment.score,
        score_text: score_text(assessment.score),
        confirmations: place.confirmations,
        added,
        is_demo: place.is_demo(),
        actions: vec![
            CardAction {
                kind: ActionKind::ViewOnMap,
                label: "View on Map".into(),
                href: map_href,
                prompt: None,
            },
            CardAction {
                kind: ActionKind::Confirm,
                label: "Confirm Accessibility".into(),
                href: None,
                prompt: None,
            },
            CardAction {
                kind: ActionKind::Report,
                label: "Report Issue".into(),
                href: None,
                prompt: Some(REPORT_PROMPT.into()),
            },
        ],
    }
}

pub fn render(places: &[Place], filter: &FeatureFilter) -> ListView {
    if places.is_empty() {
        return ListView::Empty {
            message: EMPTY_MESSAGE.into(),
        };
    }

    let visible = filter.apply(places);

    if visible.is_empty() {
        return ListView::NoMatches {
            message: NO_MATCHES_MESSAGE.into(),
        };
    }

    ListView::Cards {
        cards: visible.into_iter().map(card).collect(),
    }
}

#[test]
fn escape_html_test() {
    assert_eq!(
        escape_html("<b>Tom & Jerry's \"cafe\"</b>"),
        "&lt;b&gt;Tom &amp; Jerry&#39;s &quot;cafe&quot;&lt;/b&gt;"
    );
    assert_eq!(escape_html("plain"), "plain");
}

#[test]
fn render_empty_cache_test() {
    let view = render(&[], &FeatureFilter::new());

    assert_eq!(
        view,
        ListView::Empty {
            message: EMPTY_MESSAGE.into()
        }
    );
}

#[test]
fn render_no_matches_test() {
    use crate::entities::{place::test_place, Feature};

    let places = vec![test_place("a", &["lift"], 0)];
    let view = render(&places, &FeatureFilter::with([Feature::Parking]));

    assert_eq!(
        view,
        ListView::NoMatches {
            message: NO_MATCHES_MESSAGE.into()
        }
    );
}

#[test]
fn render_cards_in_cache_order_test() {
    use crate::entities::{place::test_place, Feature};

    let places = vec![
        test_place("a", &["lift", "parking"], 0),
        test_place("b", &["parking"], 0),
        test_place("c", &["parking", "lift", "wheelchair"], 0),
    ];

    match render(&places, &FeatureFilter::with([Feature::Lift, Feature::Parking])) {
        ListView::Cards { cards } => {
            let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids, vec!["a", "c"]);
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

#[test]
fn card_scoring_test() {
    use crate::entities::place::test_place;

    let card = card(&test_place("a", &["lift", "wheelchair", "parking"], 6));

    assert_eq!(card.confidence, Confidence::High);
    assert_eq!(card.confidence_label, "High confidence");
    assert_eq!(card.confidence_class, "confidence-high");
    assert_eq!(card.score, 5.0);
    assert_eq!(card.score_text, "5/5");
    assert_eq!(card.confirmations, 6);
}

#[test]
fn card_text_test() {
    use crate::entities::place::test_place;
    use chrono::{TimeZone, Utc};

    let mut place = test_place("a", &["step_free", "hearing_loop"], 1);
    place.name = "Hall <3>".into();
    place.notes = "  Ramp & lift  ".into();
    place.created_at = Utc.with_ymd_and_hms(2025, 9, 10, 0, 0, 0).single();

    let card = card(&place);

    assert_eq!(card.name, "Hall &lt;3&gt;");
    assert_eq!(card.notes, Some("Ramp &amp; lift".to_string()));
    assert_eq!(card.added, "9/10/2025");
    assert_eq!(card.place_type, "Office");
    assert!(!card.is_demo);

    assert_eq!(card.badges[0].icon, "\u{1F6AA}");
    assert_eq!(card.badges[0].label, "step free");
    assert_eq!(card.badges[1].icon, "");
    assert_eq!(card.badges[1].label, "hearing loop");
}

#[test]
fn card_defaults_test() {
    use crate::entities::place::test_place;

    let card = card(&test_place("a", &[], 0));

    assert_eq!(card.added, RECENTLY);
    assert_eq!(card.notes, None);
    assert_eq!(card.notes_placeholder, NO_NOTES_PLACEHOLDER);
    assert!(card.badges.is_empty());
    assert_eq!(card.confidence, Confidence::NeedsVerification);
    assert_eq!(card.score_text, "1/5");
}

#[test]
fn card_actions_test() {
    use crate::entities::place::test_place;

    let card = card(&test_place("a", &[], 0));
    let kinds: Vec<ActionKind> = card.actions.iter().map(|a| a.kind).collect();

    assert_eq!(
        kinds,
        vec![ActionKind::ViewOnMap, ActionKind::Confirm, ActionKind::Report]
    );
    assert_eq!(
        card.actions[0].href.as_deref(),
        Some("https://www.google.com/maps/search/1%20Test%20Street")
    );
    assert_eq!(card.actions[2].prompt.as_deref(), Some(REPORT_PROMPT));
    assert!(card.actions[1].prompt.is_none());
}
