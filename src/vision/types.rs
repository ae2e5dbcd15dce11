use serde::{Deserialize, Serialize};

use crate::model::LabelScore;

/// Input to [`super::ImageVerifier::verify`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageVerifyRequest {
    pub image_url: String,
    pub expected_brand: String,
    pub expected_product: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_size: Option<String>,
}

/// Outcome of the tiered image-verification policy.
///
/// `confidence` is already on the `[0, 100]` scale; `best_score` is the raw
/// top similarity in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageVerificationResult {
    pub is_verified: bool,
    pub confidence: u8,
    pub brand_detected: bool,
    pub product_detected: bool,
    pub best_match_label: String,
    pub best_score: f32,
    pub reasoning: String,
}

/// Result of classifying two images against the shared generic label set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageComparison {
    pub similarity_score: f32,
    pub are_similar: bool,
    pub image1_classification: Vec<LabelScore>,
    pub image2_classification: Vec<LabelScore>,
}

/// Product attributes inferred from free text by the zero-shot classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedAttributes {
    pub product_type: String,
    pub product_type_score: f32,
    pub set_type: String,
    pub set_type_score: f32,
    pub is_gift_set: bool,
    pub all_product_scores: Vec<LabelScore>,
}
