//! Veristock library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! This crate exposes the verification and confidence-scoring pipeline behind
//! the `veristock` server binary. The exports are organized by module:
//!
//! ## Core Types (Stable)
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`ProductQuery`], [`ProductCandidate`] - Request-scoped enrichment inputs
//! - [`EnrichmentRecord`], [`CandidateSource`] - Cached output records
//!
//! ## Verification & Scoring
//! - [`VerificationResult`], [`verify_candidate`] - Rule-based attribute matching
//! - [`ImageVerifier`], [`ImageVerificationResult`] - CLIP-backed image checks
//! - [`ConfidenceScorer`] - Signal fusion into the final [0,100] score
//!
//! ## Model Runtime
//! - [`ModelManager`] - Lazily-initialized process-wide model handles
//! - [`ClipScorer`], [`TextClassifier`] - Image-text and text zero-shot scoring
//!
//! ## Storage & Upstream
//! - [`RecordStore`], [`MemoryStore`], [`JsonFileStore`] - Cache Manager
//! - [`SourceAggregator`], [`HttpAggregator`] - Source Aggregator boundary
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod gateway;
pub mod model;
pub mod pipeline;
pub mod scoring;
pub mod verify;
pub mod vision;

pub use aggregator::{AggregatorError, HttpAggregator, RawCandidate, SourceAggregator};
#[cfg(any(test, feature = "mock"))]
pub use aggregator::MockAggregator;

pub use cache::{CacheError, CandidateSource, EnrichmentRecord, JsonFileStore, MemoryStore, RecordStore};

pub use config::{Config, ConfigError};
pub use model::{
    ClipScorer, ClipScorerConfig, LabelScore, ModelError, ModelManager, TextClassifier,
    TextClassifierConfig,
};
pub use pipeline::{EnrichError, EnrichOutcome, Enricher, ProductCandidate, ProductQuery};
pub use scoring::ConfidenceScorer;
pub use verify::{VerificationResult, verify_candidate};
pub use vision::{
    ExtractedAttributes, ImageComparison, ImageVerificationResult, ImageVerifier, ImageVerifyRequest,
    VisionError,
};
