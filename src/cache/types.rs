use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::verify::VerificationResult;
use crate::vision::ImageVerificationResult;

/// One origin that returned data for a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Whether this source returned the exact queried UPC.
    pub found_upc: bool,
    /// The source's raw payload, kept for audit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_attributes: Option<serde_json::Value>,
}

/// Final enrichment output, persisted keyed by UPC.
///
/// Records are immutable once written; re-enrichment replaces the whole
/// record for a UPC rather than patching fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub upc: String,
    pub brand: String,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msrp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub confidence_score: u8,
    pub reasoning: String,
    pub sources: Vec<CandidateSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationResult>,
    /// Absent when image verification was skipped or degraded.
    pub image_verification: Option<ImageVerificationResult>,
    pub created_at: DateTime<Utc>,
}
