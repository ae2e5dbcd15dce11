use serde::Serialize;

use crate::cache::EnrichmentRecord;
use crate::model::LabelScore;
use crate::vision::ImageVerificationResult;

/// `POST /api/enrich` response: the record plus persistence disclosure.
#[derive(Debug, Serialize)]
pub struct EnrichResponse {
    #[serde(flatten)]
    pub record: EnrichmentRecord,
    pub cached: bool,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CacheListResponse {
    pub count: usize,
    pub products: Vec<EnrichmentRecord>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub clip_model: &'static str,
    pub text_model: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VerifyImageResponse {
    pub success: bool,
    pub verification: ImageVerificationResult,
    pub raw_scores: Vec<LabelScore>,
}

#[derive(Debug, Serialize)]
pub struct CompareImagesResponse {
    pub success: bool,
    pub similarity_score: f32,
    pub are_similar: bool,
    pub image1_classification: Vec<LabelScore>,
    pub image2_classification: Vec<LabelScore>,
}

#[derive(Debug, Serialize)]
pub struct ExtractAttributesResponse {
    pub success: bool,
    pub text: String,
    pub product_type: String,
    pub product_type_score: f32,
    pub set_type: String,
    pub is_set: bool,
    pub all_product_scores: Vec<LabelScore>,
}
