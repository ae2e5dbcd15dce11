//! Rule Verifier: deterministic attribute matching.
//!
//! Wholesale buyers need exact SKU matches, so a candidate only counts as
//! verified when brand and every queried optional attribute agree. All
//! comparisons run on normalized strings; no unit conversion is attempted
//! (a differing size unit is a mismatch, not an error).

mod types;

#[cfg(test)]
mod tests;

pub use types::VerificationResult;

use tracing::debug;

/// The candidate-side attributes the Rule Verifier compares against.
#[derive(Debug, Clone, Default)]
pub struct CandidateAttributes {
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Query-side attributes; `size`/`color` are skipped when absent.
#[derive(Debug, Clone)]
pub struct QueryAttributes<'a> {
    pub brand: &'a str,
    pub size: Option<&'a str>,
    pub color: Option<&'a str>,
}

/// Lowercases, trims, and collapses internal whitespace.
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalization for brand comparison: additionally strips punctuation,
/// keeping alphanumeric tokens only.
pub fn normalize_brand(value: &str) -> String {
    value
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Brands match when the normalized strings are equal, or one is a token
/// subset of the other (tolerates suffixes like "Beauty" / "Cosmetics").
pub fn brands_match(expected: &str, found: &str) -> bool {
    let expected = normalize_brand(expected);
    let found = normalize_brand(found);

    if expected.is_empty() || found.is_empty() {
        return false;
    }
    if expected == found {
        return true;
    }

    let expected_tokens: Vec<&str> = expected.split(' ').collect();
    let found_tokens: Vec<&str> = found.split(' ').collect();

    let subset = |smaller: &[&str], larger: &[&str]| {
        smaller.iter().all(|t| larger.contains(t))
    };

    subset(&expected_tokens, &found_tokens) || subset(&found_tokens, &expected_tokens)
}

/// Sizes match on normalized string equality only.
pub fn sizes_match(expected: &str, found: &str) -> bool {
    normalize(expected) == normalize(found)
}

/// Colors match on case-insensitive substring containment either direction.
pub fn colors_match(expected: &str, found: &str) -> bool {
    let expected = normalize(expected);
    let found = normalize(found);
    if expected.is_empty() || found.is_empty() {
        return false;
    }
    expected.contains(&found) || found.contains(&expected)
}

/// Verifies one candidate's attributes against the query.
pub fn verify_candidate(query: &QueryAttributes<'_>, candidate: &CandidateAttributes) -> VerificationResult {
    let mut mismatches = Vec::new();

    let brand_match = candidate
        .brand
        .as_deref()
        .is_some_and(|found| brands_match(query.brand, found));
    if !brand_match {
        mismatches.push("brand".to_string());
    }

    // Attributes absent from the query are skipped and count as matched.
    let size_match = match query.size {
        Some(expected) => {
            let matched = candidate
                .size
                .as_deref()
                .is_some_and(|found| sizes_match(expected, found));
            if !matched {
                mismatches.push("size".to_string());
            }
            matched
        }
        None => true,
    };

    let color_match = match query.color {
        Some(expected) => {
            let matched = candidate
                .color
                .as_deref()
                .is_some_and(|found| colors_match(expected, found));
            if !matched {
                mismatches.push("color".to_string());
            }
            matched
        }
        None => true,
    };

    let is_exact_match = brand_match && size_match && color_match;

    debug!(
        brand_match,
        size_match,
        color_match,
        is_exact_match,
        mismatches = ?mismatches,
        "Rule verification complete"
    );

    VerificationResult {
        is_exact_match,
        brand_match,
        size_match,
        color_match,
        mismatches,
    }
}
