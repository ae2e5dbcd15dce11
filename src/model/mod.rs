//! Model runtime: CLIP image-text scoring, zero-shot text classification,
//! and the process-wide lazily-initialized [`ModelManager`].
//!
//! Both handles run in stub mode (deterministic lexical placeholder scores)
//! when no model path is configured, so the pipeline is testable without
//! weights on disk.

pub mod clip;
pub mod device;
pub mod error;
pub mod manager;
pub mod text;


pub use clip::{ClipScorer, ClipScorerConfig};
pub use device::select_device;
pub use error::ModelError;
pub use manager::{HandleState, ModelManager};
pub use text::{TextClassifier, TextClassifierConfig};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One candidate label with its similarity score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Sorts scores descending, ties broken by label for reproducibility.
pub(crate) fn rank_descending(mut scores: Vec<LabelScore>) -> Vec<LabelScore> {
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    scores
}

/// Deterministic placeholder score for stub mode: token recall + Jaccard
/// over the reference text, squashed into `[0, 1]`.
pub(crate) fn placeholder_score(reference: &str, label: &str) -> f32 {
    let reference_lower = reference.to_lowercase();
    let reference_words: HashSet<&str> = reference_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let label_lower = label.to_lowercase();
    let label_words: HashSet<&str> = label_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if label_words.is_empty() {
        return 0.0;
    }

    let matches = label_words.intersection(&reference_words).count();
    let recall = matches as f32 / label_words.len() as f32;

    let union = label_words.union(&reference_words).count();
    let jaccard = if union > 0 {
        matches as f32 / union as f32
    } else {
        0.0
    };

    let base_score = 0.6 * recall + 0.4 * jaccard;
    let normalized = 1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp());

    normalized.clamp(0.0, 1.0)
}

/// Ranks `labels` against `reference` with [`placeholder_score`].
pub(crate) fn placeholder_ranking(reference: &str, labels: &[String]) -> Vec<LabelScore> {
    rank_descending(
        labels
            .iter()
            .map(|label| LabelScore::new(label.clone(), placeholder_score(reference, label)))
            .collect(),
    )
}
