use serde::{Deserialize, Serialize};

use crate::cache::CandidateSource;

/// Incoming enrichment query.
///
/// `brand` is `brand_name` on the wire. Optional fields normalize the
/// literal strings `"null"`, `"None"`, and `""` to absent, since upstream
/// form data frequently encodes missing values that way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductQuery {
    pub name: String,
    #[serde(rename = "brand_name")]
    pub brand: String,
    pub upc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ProductQuery {
    /// Drops placeholder values from the optional fields.
    pub fn normalize(mut self) -> Self {
        self.size = self.size.filter(|s| !is_placeholder(s));
        self.color = self.color.filter(|s| !is_placeholder(s));
        self
    }

    /// Returns the name of the first invalid field, if any.
    pub fn invalid_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            return Some("name");
        }
        if self.brand.trim().is_empty() {
            return Some("brand_name");
        }
        if !is_valid_upc(&self.upc) {
            return Some("upc");
        }
        None
    }
}

fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed == "None"
}

/// A UPC is 8 to 13 digits.
pub fn is_valid_upc(upc: &str) -> bool {
    (8..=13).contains(&upc.len()) && upc.chars().all(|c| c.is_ascii_digit())
}

/// Aggregated attributes for one UPC, request-scoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCandidate {
    pub upc: String,
    pub brand: String,
    pub product_name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub msrp: Option<f64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub sources: Vec<CandidateSource>,
}

/// Result of one enrichment run, with persistence disclosure.
#[derive(Debug, Clone)]
pub struct EnrichOutcome {
    pub record: crate::cache::EnrichmentRecord,
    /// True when the record was served from the cache without re-enrichment.
    pub cached: bool,
    /// True when this run wrote the record to the cache.
    pub persisted: bool,
    /// Set when persistence was attempted but failed; the record is still
    /// returned, unpersisted.
    pub cache_error: Option<String>,
}
