//! Enrichment Orchestrator.
//!
//! Sequences one query through the pipeline: cache lookup, aggregator
//! search, per-candidate rule verification, candidate merging, optional
//! image verification, score fusion, and conditional persistence. Image
//! verification failures degrade to an absent result rather than failing
//! the request; aggregator failures are terminal.

mod error;
mod types;


pub use error::EnrichError;
pub use types::{EnrichOutcome, ProductCandidate, ProductQuery, is_valid_upc};

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::aggregator::{RawCandidate, SourceAggregator};
use crate::cache::{CandidateSource, EnrichmentRecord, RecordStore};
use crate::scoring::ConfidenceScorer;
use crate::verify::{self, CandidateAttributes, QueryAttributes, VerificationResult};
use crate::vision::{ImageVerifier, ImageVerifyRequest};

/// Records at or above this score from an exact rule match are persisted.
const PERSIST_THRESHOLD: u8 = 85;

/// Prices more than this multiple of the median are treated as outliers.
const PRICE_OUTLIER_FACTOR: f64 = 3.0;

pub struct Enricher<A, R> {
    aggregator: A,
    store: Arc<R>,
    verifier: ImageVerifier,
    scorer: ConfidenceScorer,
}

impl<A, R> Enricher<A, R>
where
    A: SourceAggregator,
    R: RecordStore,
{
    pub fn new(aggregator: A, store: Arc<R>, verifier: ImageVerifier) -> Self {
        Self {
            aggregator,
            store,
            verifier,
            scorer: ConfidenceScorer::new(),
        }
    }

    /// Runs the full enrichment pipeline for one query.
    pub async fn enrich(&self, query: ProductQuery) -> Result<EnrichOutcome, EnrichError> {
        let query = query.normalize();
        if let Some(field) = query.invalid_field() {
            return Err(EnrichError::InvalidInput { field });
        }

        if let Some(record) = self.store.get(&query.upc).await? {
            info!(upc = %query.upc, "Cache hit, skipping enrichment");
            return Ok(EnrichOutcome {
                record,
                cached: true,
                persisted: false,
                cache_error: None,
            });
        }

        let raw = self
            .aggregator
            .search(&query)
            .await
            .map_err(|source| EnrichError::UpstreamUnavailable { source })?;

        let candidates: Vec<RawCandidate> = raw
            .into_iter()
            .filter(|c| !is_garbage(c, &query.upc))
            .collect();

        if candidates.is_empty() {
            info!(upc = %query.upc, "No usable candidates returned");
            return Ok(EnrichOutcome {
                record: empty_record(&query),
                cached: false,
                persisted: false,
                cache_error: None,
            });
        }

        let (merged, verification) = self.select_and_merge(&query, &candidates);

        let (image_verification, image_note) = match &merged.image_url {
            Some(image_url) => {
                let request = ImageVerifyRequest {
                    image_url: image_url.clone(),
                    expected_brand: query.brand.clone(),
                    expected_product: query.name.clone(),
                    expected_color: query.color.clone(),
                    expected_size: query.size.clone(),
                };
                match self.verifier.verify(&request).await {
                    Ok((result, _raw_scores)) => (Some(result), None),
                    // Rule-matched results survive an image-boundary failure.
                    Err(e) => {
                        warn!(upc = %query.upc, error = %e, "Image verification degraded");
                        (None, Some(format!("image verification unavailable ({})", e)))
                    }
                }
            }
            None => (None, None),
        };

        let corroborating = merged.sources.iter().filter(|s| s.found_upc).count();
        let confidence_score =
            self.scorer
                .fuse(&verification, image_verification.as_ref(), corroborating);

        let reasoning = compose_reasoning(
            &verification,
            image_verification.as_ref(),
            image_note.as_deref(),
            corroborating,
            merged.sources.len(),
        );

        let record = EnrichmentRecord {
            upc: merged.upc,
            brand: merged.brand,
            product_name: merged.product_name,
            size: merged.size,
            color: merged.color,
            msrp: merged.msrp,
            image_url: merged.image_url,
            description: merged.description,
            confidence_score,
            reasoning,
            sources: merged.sources,
            verification: Some(verification.clone()),
            image_verification,
            created_at: Utc::now(),
        };

        // Only high-confidence exact matches are worth caching; everything
        // else is returned unpersisted so a better source can retry later.
        if confidence_score >= PERSIST_THRESHOLD && verification.is_exact_match {
            match self.store.upsert(record.clone()).await {
                Ok(()) => {
                    info!(upc = %record.upc, confidence_score, "Enrichment persisted");
                    return Ok(EnrichOutcome {
                        record,
                        cached: false,
                        persisted: true,
                        cache_error: None,
                    });
                }
                Err(e) => {
                    warn!(upc = %record.upc, error = %e, "Cache write failed");
                    return Ok(EnrichOutcome {
                        record,
                        cached: false,
                        persisted: false,
                        cache_error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(EnrichOutcome {
            record,
            cached: false,
            persisted: false,
            cache_error: None,
        })
    }

    /// Verifies every candidate, picks the strongest, and merges candidate
    /// data into one [`ProductCandidate`].
    fn select_and_merge(
        &self,
        query: &ProductQuery,
        candidates: &[RawCandidate],
    ) -> (ProductCandidate, VerificationResult) {
        let query_attrs = QueryAttributes {
            brand: &query.brand,
            size: query.size.as_deref(),
            color: query.color.as_deref(),
        };

        let verified: Vec<(usize, VerificationResult)> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (i, verify::verify_candidate(&query_attrs, &candidate_attrs(c))))
            .collect();

        // Strongest rule match wins; ties prefer UPC-bearing sources, then
        // the aggregator's original order.
        let (best_index, best_verification) = verified
            .iter()
            .max_by_key(|(i, v)| {
                (
                    v.match_strength(),
                    candidates[*i].found_upc,
                    std::cmp::Reverse(*i),
                )
            })
            .map(|(i, v)| (*i, v.clone()))
            .unwrap_or((0, verify::verify_candidate(&query_attrs, &CandidateAttributes::default())));

        let best = &candidates[best_index];
        debug!(
            best_source = %best.source,
            match_strength = best_verification.match_strength(),
            "Selected best candidate"
        );

        let sources: Vec<CandidateSource> = candidates
            .iter()
            .map(|c| CandidateSource {
                name: c.source.clone(),
                url: c.url.clone(),
                found_upc: c.found_upc,
                raw_attributes: serde_json::to_value(c).ok(),
            })
            .collect();

        let attrs = candidate_attrs(best);
        let merged = ProductCandidate {
            upc: query.upc.clone(),
            brand: attrs.brand.unwrap_or_else(|| query.brand.clone()),
            product_name: best
                .title
                .clone()
                .unwrap_or_else(|| query.name.clone()),
            size: attrs.size.or_else(|| query.size.clone()),
            color: attrs.color.or_else(|| query.color.clone()),
            msrp: merge_msrp(candidates),
            image_url: candidates.iter().find_map(|c| c.image_url.clone()),
            description: candidates
                .iter()
                .filter_map(|c| c.description.as_deref())
                .max_by_key(|d| d.len())
                .map(str::to_string),
            sources,
        };

        (merged, best_verification)
    }
}

/// Derives the attributes the Rule Verifier compares, falling back to the
/// listing title when a source does not expose structured fields.
fn candidate_attrs(candidate: &RawCandidate) -> CandidateAttributes {
    CandidateAttributes {
        brand: candidate.brand.clone().or_else(|| candidate.title.clone()),
        size: candidate.size.clone(),
        color: candidate.color.clone().or_else(|| candidate.title.clone()),
    }
}

/// Drops listings that carry no real data: empty or UPC-only titles, or a
/// description that just echoes the UPC under a near-empty title.
fn is_garbage(candidate: &RawCandidate, upc: &str) -> bool {
    let title = candidate.title.as_deref().unwrap_or("").trim();
    if title.is_empty() || title == upc {
        return true;
    }
    if candidate.description.as_deref().map(str::trim) == Some(upc) && title.len() < 10 {
        return true;
    }
    false
}

/// Merges candidate prices into one MSRP estimate.
///
/// UPC-confirmed prices are trusted outright (highest wins). Otherwise
/// outliers above three times the median are dropped and the 75th percentile
/// is taken when enough samples remain.
fn merge_msrp(candidates: &[RawCandidate]) -> Option<f64> {
    let confirmed: Vec<f64> = candidates
        .iter()
        .filter(|c| c.found_upc)
        .filter_map(|c| c.price)
        .filter(|p| *p > 0.0)
        .collect();
    if !confirmed.is_empty() {
        return confirmed.iter().cloned().reduce(f64::max);
    }

    let mut prices: Vec<f64> = candidates
        .iter()
        .filter_map(|c| c.price)
        .filter(|p| *p > 0.0)
        .collect();
    if prices.is_empty() {
        return None;
    }
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let median = prices[prices.len() / 2];
    let kept: Vec<f64> = prices
        .iter()
        .cloned()
        .filter(|p| *p <= median * PRICE_OUTLIER_FACTOR)
        .collect();

    if kept.len() >= 4 {
        Some(kept[(kept.len() * 3) / 4])
    } else {
        kept.iter().cloned().reduce(f64::max)
    }
}

/// Zero-confidence record returned when a successful search yields nothing
/// usable.
fn empty_record(query: &ProductQuery) -> EnrichmentRecord {
    EnrichmentRecord {
        upc: query.upc.clone(),
        brand: query.brand.clone(),
        product_name: query.name.clone(),
        size: query.size.clone(),
        color: query.color.clone(),
        msrp: None,
        image_url: None,
        description: None,
        confidence_score: 0,
        reasoning: "No usable candidates were found for this UPC".to_string(),
        sources: Vec::new(),
        verification: None,
        image_verification: None,
        created_at: Utc::now(),
    }
}

fn compose_reasoning(
    verification: &VerificationResult,
    image: Option<&crate::vision::ImageVerificationResult>,
    image_note: Option<&str>,
    corroborating: usize,
    total_sources: usize,
) -> String {
    let mut parts = Vec::new();

    if verification.is_exact_match {
        parts.push("Attributes exactly match the query".to_string());
    } else if verification.brand_match {
        parts.push(format!(
            "Brand matches; mismatched fields: {}",
            verification.mismatches.join(", ")
        ));
    } else {
        parts.push("Brand does not match the query".to_string());
    }

    match (image, image_note) {
        (Some(image), _) => parts.push(image.reasoning.clone()),
        (None, Some(note)) => parts.push(note.to_string()),
        (None, None) => {}
    }

    parts.push(format!(
        "{} of {} sources returned the queried UPC",
        corroborating, total_sources
    ));

    parts.join(". ")
}
