//! Zero-shot text classifier.
//!
//! Embeds the input text and each candidate label with the CLIP text tower
//! and softmaxes the scaled cosine similarities. A separate handle from
//! [`super::ClipScorer`] so either model can fail and retry independently.

use std::path::PathBuf;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_nn::ops::softmax;
use candle_transformers::models::clip::{self, ClipModel};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::clip::{div_l2_norm, tokenize_batch};
use super::error::ModelError;
use super::{LabelScore, placeholder_ranking, rank_descending};

/// Logit scale applied to cosine similarities before the softmax,
/// matching CLIP's learned temperature.
const LOGIT_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Default)]
pub struct TextClassifierConfig {
    /// Directory holding `model.safetensors` and `tokenizer.json`.
    pub model_path: Option<PathBuf>,
}

impl TextClassifierConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
        }
    }

    pub fn stub() -> Self {
        Self { model_path: None }
    }
}

pub struct TextClassifier {
    device: Device,
    config: TextClassifierConfig,
    model_loaded: bool,
    model: Option<ClipModel>,
    tokenizer: Option<Tokenizer>,
}

impl std::fmt::Debug for TextClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextClassifier")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.model_loaded)
            .finish()
    }
}

impl TextClassifier {
    pub fn load(config: TextClassifierConfig) -> Result<Self, ModelError> {
        let device = super::device::select_device()?;
        debug!(?device, "Selected compute device for text classifier");

        if let Some(ref model_path) = config.model_path {
            let weights_path = model_path.join("model.safetensors");
            if !weights_path.exists() {
                return Err(ModelError::LoadFailed {
                    reason: format!("Missing model.safetensors in {}", model_path.display()),
                });
            }

            let tokenizer_path = model_path.join("tokenizer.json");
            if !tokenizer_path.exists() {
                return Err(ModelError::LoadFailed {
                    reason: format!("Missing tokenizer.json in {}", model_path.display()),
                });
            }

            info!(model_path = %model_path.display(), "Loading text classifier");

            let vb = unsafe {
                VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                    .map_err(|e| ModelError::LoadFailed {
                        reason: format!("Failed to map text classifier weights: {}", e),
                    })?
            };

            let model = ClipModel::new(vb, &clip::ClipConfig::vit_base_patch32()).map_err(|e| {
                ModelError::LoadFailed {
                    reason: format!("Failed to build text classifier: {}", e),
                }
            })?;

            let tokenizer =
                Tokenizer::from_file(&tokenizer_path).map_err(|e| ModelError::LoadFailed {
                    reason: format!("Failed to load tokenizer: {}", e),
                })?;

            info!("Text classifier loaded successfully");

            Ok(Self {
                device,
                config,
                model_loaded: true,
                model: Some(model),
                tokenizer: Some(tokenizer),
            })
        } else {
            info!("No text classifier model path configured, operating in stub mode");
            Ok(Self {
                device,
                config,
                model_loaded: false,
                model: None,
                tokenizer: None,
            })
        }
    }

    pub fn stub() -> Result<Self, ModelError> {
        Self::load(TextClassifierConfig::stub())
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model_loaded
    }

    /// Ranks `labels` against `text`, descending. Scores softmax to 1 over
    /// the label set.
    pub fn classify(&self, text: &str, labels: &[String]) -> Result<Vec<LabelScore>, ModelError> {
        if labels.is_empty() {
            return Err(ModelError::EmptyLabelSet);
        }

        debug!(
            text_len = text.len(),
            num_labels = labels.len(),
            model_loaded = self.model_loaded,
            "Classifying text against label set"
        );

        if let (Some(model), Some(tokenizer)) = (&self.model, &self.tokenizer) {
            let text_ids = tokenize_batch(tokenizer, &[text.to_string()], &self.device)?;
            let label_ids = tokenize_batch(tokenizer, labels, &self.device)?;

            let text_features = div_l2_norm(&model.get_text_features(&text_ids).map_err(|e| {
                ModelError::InferenceFailed {
                    reason: e.to_string(),
                }
            })?)?;
            let label_features = div_l2_norm(&model.get_text_features(&label_ids).map_err(
                |e| ModelError::InferenceFailed {
                    reason: e.to_string(),
                },
            )?)?;

            // (1, d) x (d, n) -> similarity row scaled to CLIP temperature.
            let similarities = text_features
                .matmul(&label_features.t()?)?
                .affine(LOGIT_SCALE, 0.0)?;
            let probs = softmax(&similarities, 1)?.flatten_all()?.to_vec1::<f32>()?;

            return Ok(rank_descending(
                labels
                    .iter()
                    .zip(probs)
                    .map(|(label, score)| LabelScore::new(label.clone(), score))
                    .collect(),
            ));
        }

        Ok(placeholder_ranking(text, labels))
    }
}
