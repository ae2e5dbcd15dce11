use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::error::AggregatorError;
use super::{RawCandidate, SourceAggregator};
use crate::pipeline::ProductQuery;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    candidates: Vec<RawCandidate>,
}

/// Aggregator client over the HTTP search service.
#[derive(Debug, Clone)]
pub struct HttpAggregator {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAggregator {
    /// Builds a client with the search timeout applied to every request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AggregatorError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| AggregatorError::ClientBuild { source })?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl SourceAggregator for HttpAggregator {
    async fn search(&self, query: &ProductQuery) -> Result<Vec<RawCandidate>, AggregatorError> {
        let url = format!("{}/search", self.base_url);
        debug!(url = %url, upc = %query.upc, "Querying source aggregator");

        let response = self
            .http
            .post(&url)
            .json(query)
            .send()
            .await
            .map_err(|source| AggregatorError::Transport { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::BadStatus {
                status: status.as_u16(),
            });
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|source| AggregatorError::BadPayload { source })?;

        info!(
            upc = %query.upc,
            num_candidates = payload.candidates.len(),
            "Source aggregator search complete"
        );

        Ok(payload.candidates)
    }
}
