use anyhow::{anyhow, ensure, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;

use hybridrag_core::config::{expand_path, EmbeddingConfig};
use hybridrag_core::error::Error;
use hybridrag_core::traits::Embedder;

use crate::pool::masked_mean_l2;

/// XLM-RoBERTa pad token id.
const PAD_ID: u32 = 1;

/// multilingual-e5 style encoder: one forward pass per batch, sequences padded
/// to the longest member (capped at `max_len`).
pub struct EmbeddingModel {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl EmbeddingModel {
    pub fn load(config: &EmbeddingConfig) -> Result<Self> {
        let device = select_device();
        let model_dir = resolve_model_dir(config.model_dir.as_deref())?;
        tracing::info!(dir = %model_dir.display(), "loading embedding model");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let model_config: XLMRobertaConfig = serde_json::from_str(&std::fs::read_to_string(model_dir.join("config.json"))?)?;
        let vb = VarBuilder::from_tensors(load_weights(&model_dir, &device)?, DType::F32, &device);
        let model = XLMRobertaModel::new(&model_config, vb)?;
        tracing::info!(dim = config.dimension, max_len = config.max_len, "embedding model loaded");
        Ok(Self { model, tokenizer, device, dim: config.dimension, max_len: config.max_len.max(1) })
    }

    pub fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let start = Instant::now();
        let (input_ids, attention_mask) = self.tokenize(texts)?;
        let token_type_ids = Tensor::zeros(input_ids.dims2()?, DType::I64, &self.device)?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let rows: Vec<Vec<f32>> = masked_mean_l2(&hidden, &attention_mask)?.to_device(&Device::Cpu)?.to_vec2()?;
        ensure!(
            rows.iter().all(|r| r.len() == self.dim),
            "model produced {} dimensions, configured {}",
            rows.first().map_or(0, Vec::len),
            self.dim
        );
        tracing::debug!(batch = texts.len(), elapsed = ?start.elapsed(), "encoded batch");
        Ok(rows)
    }

    fn tokenize(&self, texts: &[String]) -> Result<(Tensor, Tensor)> {
        let encodings = self.tokenizer.encode_batch(texts.to_vec(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let seq_len = encodings.iter().map(|e| e.get_ids().len().min(self.max_len)).max().unwrap_or(1).max(1);
        let mut ids = Vec::with_capacity(texts.len() * seq_len);
        let mut mask = Vec::with_capacity(texts.len() * seq_len);
        for enc in &encodings {
            let n = enc.get_ids().len().min(seq_len);
            ids.extend_from_slice(&enc.get_ids()[..n]);
            ids.extend(std::iter::repeat(PAD_ID).take(seq_len - n));
            mask.extend_from_slice(&enc.get_attention_mask()[..n]);
            mask.extend(std::iter::repeat(0u32).take(seq_len - n));
        }
        let input_ids = Tensor::from_vec(ids, (texts.len(), seq_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (texts.len(), seq_len), &self.device)?;
        Ok((input_ids, attention_mask))
    }
}

impl Embedder for EmbeddingModel {
    fn dim(&self) -> usize {
        self.dim
    }
    fn max_len(&self) -> usize {
        self.max_len
    }
    fn embed_batch(&self, texts: &[String]) -> hybridrag_core::Result<Vec<Vec<f32>>> {
        self.encode(texts).map_err(|e| Error::Embedding(e.to_string()))
    }
}

fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(dev) => {
                tracing::info!("embedding on Metal");
                return dev;
            }
            Err(e) => tracing::warn!(error = %e, "Metal unavailable, falling back to CPU"),
        }
    }
    tracing::info!("embedding on CPU");
    Device::Cpu
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&pickle)?;
    weights.into_iter().map(|(name, t)| -> Result<(String, Tensor)> { Ok((name, t.to_device(device)?)) }).collect()
}

fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = expand_path(dir);
        ensure!(p.exists(), "embedding.model_dir {} does not exist", p.display());
        return Ok(p);
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = expand_path(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    ["models/multilingual-e5-large", "../models/multilingual-e5-large"]
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("Could not locate the embedding model directory; set embedding.model_dir"))
}
