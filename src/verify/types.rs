use serde::{Deserialize, Serialize};

/// Outcome of rule-based attribute matching for one candidate.
///
/// `mismatches` names every failing field among those present in the query;
/// fields the query did not ask about never appear there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_exact_match: bool,
    pub brand_match: bool,
    pub size_match: bool,
    pub color_match: bool,
    pub mismatches: Vec<String>,
}

impl VerificationResult {
    /// Count of attribute checks that passed (used to rank candidates).
    pub fn match_strength(&self) -> u8 {
        [self.brand_match, self.size_match, self.color_match]
            .iter()
            .filter(|&&m| m)
            .count() as u8
    }
}
