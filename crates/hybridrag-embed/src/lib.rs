//! hybridrag-embed
//!
//! Embedding service implementations behind `hybridrag_core::traits::Embedder`:
//! a candle XLM-RoBERTa encoder (multilingual-e5 checkpoints, mean pooled and
//! L2 normalised) and a deterministic hash embedder for tests and dry runs.
//! Also hosts the embedding-similarity topic resolver.

pub mod encoder;
pub mod pool;
pub mod topic;

use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;

use hybridrag_core::config::EmbeddingConfig;
use hybridrag_core::error::Error;
use hybridrag_core::traits::Embedder;

pub use encoder::EmbeddingModel;
pub use pool::masked_mean_l2;
pub use topic::{cosine_similarity, EmbeddingTopicResolver};

/// Token-hashing embedder: deterministic, L2 normalised, no model files.
/// Texts sharing whitespace tokens get positively correlated vectors.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed_batch(&self, texts: &[String]) -> hybridrag_core::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

pub fn get_default_embedder(config: &EmbeddingConfig) -> hybridrag_core::Result<Box<dyn Embedder>> {
    if config.fake {
        tracing::info!(dim = config.dimension, "using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(config.dimension)));
    }
    let model = EmbeddingModel::load(config).map_err(|e| Error::Embedding(e.to_string()))?;
    Ok(Box::new(model))
}
