use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("Aggregator request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("Aggregator returned status {status}")]
    BadStatus { status: u16 },

    #[error("Aggregator returned an unparseable response: {source}")]
    BadPayload {
        #[source]
        source: reqwest::Error,
    },
}
