use thiserror::Error;

use crate::model::ModelError;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch image from {url}: {source}")]
    ImageFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode image from {url}: {reason}")]
    ImageDecode { url: String, reason: String },

    #[error("Classification task failed: {reason}")]
    TaskFailed { reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl VisionError {
    /// True when the failure is an upstream transport problem rather than a
    /// model or input problem.
    pub fn is_upstream(&self) -> bool {
        matches!(self, VisionError::ImageFetch { .. })
    }
}
