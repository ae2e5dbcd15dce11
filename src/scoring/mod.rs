//! Confidence Scorer: fuses rule verification, image verification, and
//! source evidence into the record's final score.
//!
//! Every signal is monotone: more matching fields, higher image confidence,
//! or more corroborating sources can only raise the result. The output is
//! clamped to `[0, 100]`.

#[cfg(test)]
mod tests;

use tracing::debug;

use crate::verify::VerificationResult;
use crate::vision::ImageVerificationResult;

/// Baseline when brand and every queried attribute match.
const EXACT_MATCH_BASELINE: i32 = 85;
/// Baseline when the brand matches but a queried attribute does not.
const BRAND_MATCH_BASELINE: i32 = 55;
/// Baseline when the brand does not match.
const NO_MATCH_BASELINE: i32 = 10;

/// Image bonus is `confidence / IMAGE_BONUS_DIVISOR`, at most +10.
const IMAGE_BONUS_DIVISOR: i32 = 10;
/// Penalty when the image check contradicts an exact rule match.
const IMAGE_CONTRADICTION_PENALTY: i32 = 10;

/// Bonus per corroborating UPC-bearing source beyond the first.
const PER_SOURCE_BONUS: i32 = 5;
const SOURCE_BONUS_CAP: i32 = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Computes the final confidence score for one enrichment.
    ///
    /// `corroborating_sources` counts sources that returned the queried UPC.
    pub fn fuse(
        &self,
        rule: &VerificationResult,
        image: Option<&ImageVerificationResult>,
        corroborating_sources: usize,
    ) -> u8 {
        let baseline = if rule.is_exact_match {
            EXACT_MATCH_BASELINE
        } else if rule.brand_match {
            BRAND_MATCH_BASELINE
        } else {
            NO_MATCH_BASELINE
        };

        let image_adjustment = match image {
            Some(image) if image.is_verified => i32::from(image.confidence) / IMAGE_BONUS_DIVISOR,
            // An unverified image against an exact rule match is a conflict
            // worth surfacing in the score, not ignoring.
            Some(_) if rule.is_exact_match => -IMAGE_CONTRADICTION_PENALTY,
            _ => 0,
        };

        let source_bonus = (corroborating_sources.saturating_sub(1) as i32 * PER_SOURCE_BONUS)
            .min(SOURCE_BONUS_CAP);

        let score = (baseline + image_adjustment + source_bonus).clamp(0, 100);

        debug!(
            baseline,
            image_adjustment,
            source_bonus,
            score,
            "Fused confidence signals"
        );

        score as u8
    }
}
