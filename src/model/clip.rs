//! CLIP image-text similarity scorer.
//!
//! Wraps the candle CLIP ViT-B/32 checkpoint. With no model path configured
//! the scorer runs in stub mode and ranks labels with the deterministic
//! placeholder scorer instead of real inference.

use std::path::PathBuf;

use candle_core::{D, DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_nn::ops::softmax;
use candle_transformers::models::clip::{self, ClipModel};
use image::DynamicImage;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::error::ModelError;
use super::{LabelScore, placeholder_ranking, rank_descending};

#[derive(Debug, Clone)]
pub struct ClipScorerConfig {
    /// Directory holding `model.safetensors` and `tokenizer.json`.
    pub model_path: Option<PathBuf>,
}

impl Default for ClipScorerConfig {
    fn default() -> Self {
        Self { model_path: None }
    }
}

impl ClipScorerConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
        }
    }

    pub fn stub() -> Self {
        Self { model_path: None }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err("model_path cannot be empty when provided".to_string());
        }
        Ok(())
    }
}

pub struct ClipScorer {
    device: Device,
    config: ClipScorerConfig,
    model_loaded: bool,
    model: Option<ClipModel>,
    tokenizer: Option<Tokenizer>,
    image_size: usize,
}

impl std::fmt::Debug for ClipScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipScorer")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.model_loaded)
            .finish()
    }
}

impl ClipScorer {
    pub fn load(config: ClipScorerConfig) -> Result<Self, ModelError> {
        if let Err(msg) = config.validate() {
            return Err(ModelError::InvalidConfig { reason: msg });
        }

        let device = super::device::select_device()?;
        debug!(?device, "Selected compute device for CLIP scorer");

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

            info!(model_path = %model_path.display(), "Loading CLIP model");

            let clip_config = clip::ClipConfig::vit_base_patch32();

            let vb = unsafe {
                VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                    .map_err(|e| ModelError::LoadFailed {
                        reason: format!("Failed to map CLIP weights: {}", e),
                    })?
            };

            let model = ClipModel::new(vb, &clip_config).map_err(|e| ModelError::LoadFailed {
                reason: format!("Failed to build CLIP model: {}", e),
            })?;

            let tokenizer =
                Tokenizer::from_file(&tokenizer_path).map_err(|e| ModelError::LoadFailed {
                    reason: format!("Failed to load tokenizer: {}", e),
                })?;

            info!("CLIP model loaded successfully");

            Ok(Self {
                device,
                config,
                model_loaded: true,
                model: Some(model),
                tokenizer: Some(tokenizer),
                image_size: clip_config.image_size,
            })
        } else {
            info!("No CLIP model path configured, operating in stub mode");
            Ok(Self::create_stub(device, config))
        }
    }

    pub fn stub() -> Result<Self, ModelError> {
        Self::load(ClipScorerConfig::stub())
    }

    fn create_stub(device: Device, config: ClipScorerConfig) -> Self {
        Self {
            device,
            config,
            model_loaded: false,
            model: None,
            tokenizer: None,
            image_size: 224,
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model_loaded
    }

    pub fn config(&self) -> &ClipScorerConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Ranks `labels` against a decoded image, descending by similarity.
    ///
    /// Scores are the softmax of the CLIP image-text logits, so they sum to 1
    /// over the label set and each lies in `[0, 1]`.
    pub fn classify_image(
        &self,
        image: &DynamicImage,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, ModelError> {
        if labels.is_empty() {
            return Err(ModelError::EmptyLabelSet);
        }

        debug!(
            num_labels = labels.len(),
            model_loaded = self.model_loaded,
            "Classifying image against label set"
        );

        let (Some(model), Some(tokenizer)) = (&self.model, &self.tokenizer) else {
            return Err(ModelError::InferenceFailed {
                reason: "classify_image called on stub scorer".to_string(),
            });
        };

        let pixel_values = self.preprocess(image)?;
        let input_ids = tokenize_batch(tokenizer, labels, &self.device)?;

        let (_logits_per_text, logits_per_image) = model
            .forward(&pixel_values, &input_ids)
            .map_err(|e| ModelError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let probs = softmax(&logits_per_image, 1)?.flatten_all()?.to_vec1::<f32>()?;

        Ok(rank_descending(
            labels
                .iter()
                .zip(probs)
                .map(|(label, score)| LabelScore::new(label.clone(), score))
                .collect(),
        ))
    }

    /// Stub-mode ranking: deterministic lexical scores keyed by a reference
    /// string (typically the image URL).
    pub fn classify_reference(
        &self,
        reference: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, ModelError> {
        if labels.is_empty() {
            return Err(ModelError::EmptyLabelSet);
        }

        let ranked = placeholder_ranking(reference, labels);
        debug!(
            top_label = %ranked[0].label,
            top_score = ranked[0].score,
            "Computed ranking (stub)"
        );
        Ok(ranked)
    }

    fn preprocess(&self, image: &DynamicImage) -> Result<Tensor, ModelError> {
        let size = self.image_size as u32;
        let resized = image.resize_to_fill(size, size, image::imageops::FilterType::Triangle);
        let rgb = resized.to_rgb8();

        // HWC u8 -> CHW f32 scaled to [-1, 1], batch dim prepended.
        let tensor = Tensor::from_vec(
            rgb.into_raw(),
            (self.image_size, self.image_size, 3),
            &self.device,
        )?
        .permute((2, 0, 1))?
        .to_dtype(DType::F32)?
        .affine(2.0 / 255.0, -1.0)?
        .unsqueeze(0)?;

        Ok(tensor)
    }
}

/// Encodes a batch of label strings, padded to the longest sequence.
pub(crate) fn tokenize_batch(
    tokenizer: &Tokenizer,
    labels: &[String],
    device: &Device,
) -> Result<Tensor, ModelError> {
    let pad_id = tokenizer.token_to_id("<|endoftext|>").unwrap_or(0);

    let mut sequences: Vec<Vec<u32>> = Vec::with_capacity(labels.len());
    for label in labels {
        let encoding =
            tokenizer
                .encode(label.as_str(), true)
                .map_err(|e| ModelError::TokenizationFailed {
                    reason: e.to_string(),
                })?;
        sequences.push(encoding.get_ids().to_vec());
    }

    let max_len = sequences.iter().map(Vec::len).max().unwrap_or(0);
    for sequence in &mut sequences {
        sequence.resize(max_len, pad_id);
    }

    Ok(Tensor::new(sequences, device)?)
}

/// L2-normalizes the last dimension (used for embedding cosine similarity).
pub(crate) fn div_l2_norm(v: &Tensor) -> Result<Tensor, ModelError> {
    let l2_norm = v.sqr()?.sum_keepdim(D::Minus1)?.sqrt()?;
    Ok(v.broadcast_div(&l2_norm)?)
}
