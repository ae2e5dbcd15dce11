//! Source Aggregator boundary.
//!
//! The aggregator performs external lookups and returns raw candidates per
//! query. The pipeline treats it as opaque; retry and rate-limit logic lives
//! on the other side of this trait.

mod error;
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use error::AggregatorError;
pub use http::HttpAggregator;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockAggregator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::pipeline::ProductQuery;

/// One raw candidate record as returned by an upstream source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCandidate {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Whether the source returned the exact queried UPC.
    #[serde(default)]
    pub found_upc: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[async_trait]
pub trait SourceAggregator: Send + Sync {
    /// Looks the query up across all configured sources.
    ///
    /// An empty vec is a successful search that found nothing; transport
    /// failures surface as [`AggregatorError`].
    async fn search(&self, query: &ProductQuery) -> Result<Vec<RawCandidate>, AggregatorError>;
}
