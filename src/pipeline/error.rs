use thiserror::Error;

use crate::aggregator::AggregatorError;

#[derive(Error, Debug)]
pub enum EnrichError {
    /// Request rejected before any work was performed.
    #[error("Invalid or missing field: {field}")]
    InvalidInput { field: &'static str },

    /// The source aggregator was unreachable or failed outright.
    #[error("Source aggregator unavailable: {source}")]
    UpstreamUnavailable {
        #[source]
        source: AggregatorError,
    },

    /// Cache read failed before enrichment could start.
    #[error(transparent)]
    Cache(#[from] crate::cache::CacheError),
}
