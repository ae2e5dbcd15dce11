use super::*;
use crate::verify::VerificationResult;
use crate::vision::ImageVerificationResult;

fn rule(is_exact_match: bool, brand_match: bool) -> VerificationResult {
    VerificationResult {
        is_exact_match,
        brand_match,
        size_match: is_exact_match,
        color_match: is_exact_match,
        mismatches: Vec::new(),
    }
}

fn image(is_verified: bool, confidence: u8) -> ImageVerificationResult {
    ImageVerificationResult {
        is_verified,
        confidence,
        brand_detected: is_verified,
        product_detected: is_verified,
        best_match_label: "label".to_string(),
        best_score: f32::from(confidence) / 100.0,
        reasoning: String::new(),
    }
}

#[test]
fn exact_match_alone_scores_the_exact_baseline() {
    let scorer = ConfidenceScorer::new();
    assert_eq!(scorer.fuse(&rule(true, true), None, 1), 85);
}

#[test]
fn brand_only_match_scores_lower() {
    let scorer = ConfidenceScorer::new();
    let exact = scorer.fuse(&rule(true, true), None, 1);
    let brand_only = scorer.fuse(&rule(false, true), None, 1);
    let no_match = scorer.fuse(&rule(false, false), None, 1);
    assert!(exact > brand_only);
    assert!(brand_only > no_match);
    assert_eq!(no_match, 10);
}

#[test]
fn verified_image_adds_bounded_bonus() {
    let scorer = ConfidenceScorer::new();
    let without = scorer.fuse(&rule(true, true), None, 1);
    let with = scorer.fuse(&rule(true, true), Some(&image(true, 95)), 1);
    assert!(with > without);
    assert!(with - without <= 10);
}

#[test]
fn unverified_image_penalizes_an_exact_match() {
    let scorer = ConfidenceScorer::new();
    let clean = scorer.fuse(&rule(true, true), None, 1);
    let contradicted = scorer.fuse(&rule(true, true), Some(&image(false, 20)), 1);
    assert_eq!(clean - contradicted, 10);
}

#[test]
fn unverified_image_does_not_penalize_a_partial_match() {
    let scorer = ConfidenceScorer::new();
    let without = scorer.fuse(&rule(false, true), None, 1);
    let with = scorer.fuse(&rule(false, true), Some(&image(false, 20)), 1);
    assert_eq!(without, with);
}

#[test]
fn corroborating_sources_add_capped_bonus() {
    let scorer = ConfidenceScorer::new();
    let base = scorer.fuse(&rule(false, true), None, 1);
    assert_eq!(scorer.fuse(&rule(false, true), None, 2), base + 5);
    assert_eq!(scorer.fuse(&rule(false, true), None, 3), base + 10);
    // Cap: a fourth source adds nothing.
    assert_eq!(scorer.fuse(&rule(false, true), None, 4), base + 10);
}

#[test]
fn zero_sources_scores_like_one() {
    let scorer = ConfidenceScorer::new();
    assert_eq!(
        scorer.fuse(&rule(false, true), None, 0),
        scorer.fuse(&rule(false, true), None, 1)
    );
}

#[test]
fn score_is_always_bounded() {
    let scorer = ConfidenceScorer::new();
    for exact in [true, false] {
        for brand in [true, false] {
            for sources in 0..6 {
                for img in [
                    None,
                    Some(image(true, 100)),
                    Some(image(false, 0)),
                ] {
                    let score = scorer.fuse(&rule(exact, brand), img.as_ref(), sources);
                    assert!(score <= 100);
                }
            }
        }
    }
}

#[test]
fn image_confidence_is_monotone() {
    let scorer = ConfidenceScorer::new();
    let mut last = 0;
    for confidence in (0..=100).step_by(10) {
        let score = scorer.fuse(&rule(true, true), Some(&image(true, confidence)), 1);
        assert!(score >= last);
        last = score;
    }
}

#[test]
fn adding_a_source_never_lowers_the_score() {
    let scorer = ConfidenceScorer::new();
    for sources in 1..6 {
        let fewer = scorer.fuse(&rule(true, true), Some(&image(true, 80)), sources);
        let more = scorer.fuse(&rule(true, true), Some(&image(true, 80)), sources + 1);
        assert!(more >= fewer);
    }
}
