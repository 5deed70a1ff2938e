//! Confidence tier and star score for a place.
//!
//! Both measures are derived from the same two inputs, the number of
//! accessibility features and the number of confirmations, but with
//! independent rates. A place can read "Moderate confidence" next to a
//! score close to 5, and that is expected.

use serde::{Deserialize, Serialize};

const FEATURE_POINTS: f64 = 1.0;
const CONFIRMATION_POINTS: f64 = 0.8;
const HIGH_THRESHOLD: f64 = 4.0;
const MODERATE_THRESHOLD: f64 = 2.0;

const SCORE_BASE: f64 = 1.0;
const SCORE_PER_CONFIRMATION: f64 = 0.8;
const SCORE_PER_FEATURE: f64 = 0.2;
pub const MAX_SCORE: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Moderate,
    NeedsVerification,
}

impl Confidence {
    /// Thresholds are inclusive lower bounds, checked from the top.
    pub fn from_points(points: f64) -> Self {
        if points >= HIGH_THRESHOLD {
            Self::High
        } else if points >= MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::NeedsVerification
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High confidence",
            Self::Moderate => "Moderate confidence",
            Self::NeedsVerification => "Needs verification",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::High => "confidence-high",
            Self::Moderate => "confidence-medium",
            Self::NeedsVerification => "confidence-low",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub points: f64,
    pub confidence: Confidence,
    pub score: f64,
}

pub fn points(feature_count: usize, confirmations: u64) -> f64 {
    feature_count as f64 * FEATURE_POINTS + confirmations as f64 * CONFIRMATION_POINTS
}

/// Display score in `[1.0, 5.0]`, rounded to one decimal.
pub fn score(feature_count: usize, confirmations: u64) -> f64 {
    let raw = SCORE_BASE
        + confirmations as f64 * SCORE_PER_CONFIRMATION
        + feature_count as f64 * SCORE_PER_FEATURE;

    round_tenth(raw.min(MAX_SCORE))
}

pub fn assess(feature_count: usize, confirmations: u64) -> Assessment {
    let points = points(feature_count, confirmations);

    Assessment {
        points,
        confidence: Confidence::from_points(points),
        score: score(feature_count, confirmations),
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Renders a score the way cards show it, e.g. `5/5` or `2.4/5`.
pub fn score_text(score: f64) -> String {
    format!("{}/5", score)
}

#[test]
fn confidence_threshold_test() {
    assert_eq!(Confidence::from_points(4.0), Confidence::High);
    assert_eq!(Confidence::from_points(3.99), Confidence::Moderate);
    assert_eq!(Confidence::from_points(2.0), Confidence::Moderate);
    assert_eq!(Confidence::from_points(1.99), Confidence::NeedsVerification);
    assert_eq!(Confidence::from_points(0.0), Confidence::NeedsVerification);
    assert_eq!(Confidence::from_points(100.0), Confidence::High);
}

#[test]
fn confidence_text_test() {
    assert_eq!(Confidence::High.label(), "High confidence");
    assert_eq!(Confidence::Moderate.label(), "Moderate confidence");
    assert_eq!(Confidence::NeedsVerification.label(), "Needs verification");
    assert_eq!(Confidence::High.css_class(), "confidence-high");
    assert_eq!(Confidence::Moderate.css_class(), "confidence-medium");
    assert_eq!(Confidence::NeedsVerification.css_class(), "confidence-low");
}

#[test]
fn assess_examples_test() {
    let assessment = assess(3, 6);
    assert!((assessment.points - 7.8).abs() < 1e-9);
    assert_eq!(assessment.confidence, Confidence::High);
    assert_eq!(assessment.score, 5.0);
    assert_eq!(score_text(assessment.score), "5/5");

    let assessment = assess(1, 1);
    assert!((assessment.points - 1.8).abs() < 1e-9);
    assert_eq!(assessment.confidence, Confidence::NeedsVerification);
    assert_eq!(assessment.score, 2.0);
    assert_eq!(score_text(assessment.score), "2/5");

    let assessment = assess(0, 0);
    assert_eq!(assessment.confidence, Confidence::NeedsVerification);
    assert_eq!(assessment.score, 1.0);
}

#[test]
fn confirmation_only_boundaries_test() {
    // 5 * 0.8 lands exactly on the high threshold
    assert_eq!(assess(0, 5).confidence, Confidence::High);
    assert_eq!(assess(0, 4).confidence, Confidence::Moderate);
    assert_eq!(assess(0, 3).confidence, Confidence::Moderate);
    assert_eq!(assess(0, 2).confidence, Confidence::NeedsVerification);
    assert_eq!(assess(2, 0).confidence, Confidence::Moderate);
    assert_eq!(assess(4, 0).confidence, Confidence::High);
}

#[test]
fn tiers_and_scores_diverge_test() {
    // moderate tier with a near-maximal score
    let assessment = assess(0, 4);
    assert_eq!(assessment.confidence, Confidence::Moderate);
    assert_eq!(assessment.score, 4.2);

    // high tier with a modest score
    let assessment = assess(5, 0);
    assert_eq!(assessment.confidence, Confidence::High);
    assert_eq!(assessment.score, 2.0);
}

#[test]
fn score_rounding_test() {
    assert_eq!(score(2, 1), 2.2);
    assert_eq!(score(3, 1), 2.4);
    assert_eq!(score(1, 2), 2.8);
    assert_eq!(score(5, 3), 4.4);
    assert_eq!(score_text(score(3, 1)), "2.4/5");
}

#[test]
fn score_bounds_and_monotonicity_test() {
    for features in 0..=12usize {
        for confirmations in 0..=40u64 {
            let s = score(features, confirmations);

            assert!(s >= 1.0 && s <= MAX_SCORE, "score {} out of range", s);
            assert!(score(features + 1, confirmations) >= s);
            assert!(score(features, confirmations + 1) >= s);
        }
    }

    assert_eq!(score(usize::MAX, u64::MAX), MAX_SCORE);
}
