//! Process-wide model handle manager.
//!
//! Both handles are expensive to initialize, so loading is deferred until
//! first use and guarded by a [`tokio::sync::OnceCell`]: concurrent first
//! callers await the same in-flight load instead of racing. A failed load
//! leaves the cell empty, so the next request retries initialization.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::info;

use super::clip::{ClipScorer, ClipScorerConfig};
use super::error::ModelError;
use super::text::{TextClassifier, TextClassifierConfig};

/// Load state of one model handle, reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleState {
    /// Weights loaded and ready for inference.
    Loaded,
    /// Initialized in stub mode (no weights configured).
    Stub,
    /// Not yet initialized.
    NotLoaded,
}

impl HandleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleState::Loaded => "loaded",
            HandleState::Stub => "stub",
            HandleState::NotLoaded => "not loaded",
        }
    }
}

pub struct ModelManager {
    clip_config: ClipScorerConfig,
    text_config: TextClassifierConfig,
    clip: OnceCell<Arc<ClipScorer>>,
    text: OnceCell<Arc<TextClassifier>>,
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("clip_state", &self.clip_state())
            .field("text_state", &self.text_state())
            .finish()
    }
}

impl ModelManager {
    pub fn new(clip_config: ClipScorerConfig, text_config: TextClassifierConfig) -> Self {
        Self {
            clip_config,
            text_config,
            clip: OnceCell::new(),
            text: OnceCell::new(),
        }
    }

    /// Manager with both handles in stub mode (used by tests).
    pub fn stub() -> Self {
        Self::new(ClipScorerConfig::stub(), TextClassifierConfig::stub())
    }

    /// Returns the initialized CLIP scorer, loading it on first access.
    pub async fn acquire_clip(&self) -> Result<Arc<ClipScorer>, ModelError> {
        self.clip
            .get_or_try_init(|| async {
                let config = self.clip_config.clone();
                info!("Initializing CLIP scorer handle");
                let scorer = tokio::task::spawn_blocking(move || ClipScorer::load(config))
                    .await
                    .map_err(|e| ModelError::LoadFailed {
                        reason: format!("CLIP load task failed: {}", e),
                    })??;
                Ok(Arc::new(scorer))
            })
            .await
            .cloned()
    }

    /// Returns the initialized text classifier, loading it on first access.
    pub async fn acquire_text(&self) -> Result<Arc<TextClassifier>, ModelError> {
        self.text
            .get_or_try_init(|| async {
                let config = self.text_config.clone();
                info!("Initializing text classifier handle");
                let classifier = tokio::task::spawn_blocking(move || TextClassifier::load(config))
                    .await
                    .map_err(|e| ModelError::LoadFailed {
                        reason: format!("Text classifier load task failed: {}", e),
                    })??;
                Ok(Arc::new(classifier))
            })
            .await
            .cloned()
    }

    /// Eagerly initializes both handles. Errors from either load are returned,
    /// but a failure on one handle does not prevent loading the other.
    pub async fn preload(&self) -> Result<(), ModelError> {
        let clip_result = self.acquire_clip().await;
        let text_result = self.acquire_text().await;
        clip_result?;
        text_result?;
        Ok(())
    }

    pub fn clip_state(&self) -> HandleState {
        match self.clip.get() {
            Some(scorer) if scorer.is_model_loaded() => HandleState::Loaded,
            Some(_) => HandleState::Stub,
            None => HandleState::NotLoaded,
        }
    }

    pub fn text_state(&self) -> HandleState {
        match self.text.get() {
            Some(classifier) if classifier.is_model_loaded() => HandleState::Loaded,
            Some(_) => HandleState::Stub,
            None => HandleState::NotLoaded,
        }
    }
}
