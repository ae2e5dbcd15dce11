use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::AggregatorError;
use super::{RawCandidate, SourceAggregator};
use crate::pipeline::ProductQuery;

/// Scriptable aggregator for tests: returns a fixed candidate list, or a
/// transport error when `fail` is set.
#[derive(Debug, Default)]
pub struct MockAggregator {
    candidates: Mutex<Vec<RawCandidate>>,
    fail: Mutex<bool>,
    search_count: Mutex<usize>,
}

impl MockAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(candidates: Vec<RawCandidate>) -> Self {
        Self {
            candidates: Mutex::new(candidates),
            ..Self::default()
        }
    }

    pub fn set_candidates(&self, candidates: Vec<RawCandidate>) {
        *self.candidates.lock() = candidates;
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    /// Number of searches performed, for asserting cache hits skip upstream.
    pub fn search_count(&self) -> usize {
        *self.search_count.lock()
    }
}

#[async_trait]
impl SourceAggregator for MockAggregator {
    async fn search(&self, _query: &ProductQuery) -> Result<Vec<RawCandidate>, AggregatorError> {
        *self.search_count.lock() += 1;
        if *self.fail.lock() {
            return Err(AggregatorError::BadStatus { status: 503 });
        }
        Ok(self.candidates.lock().clone())
    }
}
