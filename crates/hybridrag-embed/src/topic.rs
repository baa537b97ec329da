use std::sync::Arc;

use hybridrag_core::error::Result;
use hybridrag_core::traits::{Embedder, TopicResolver};
use hybridrag_core::types::EmbedRole;

/// Picks the candidate label whose embedding is closest to the question.
pub struct EmbeddingTopicResolver {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingTopicResolver {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }
}

impl TopicResolver for EmbeddingTopicResolver {
    fn resolve(&self, question: &str, candidates: &[String]) -> Result<Option<String>> {
        if candidates.is_empty() {
            return Ok(None);
        }
        // labels are embedded as passages: they play the document side of the match
        let Some(question_vec) = self.embedder.embed_as(EmbedRole::Query, &[question.to_string()])?.pop() else {
            return Ok(None);
        };
        let label_vecs = self.embedder.embed_as(EmbedRole::Passage, candidates)?;

        // Ties keep the earliest candidate.
        let mut best: Option<(usize, f32)> = None;
        for (i, label_vec) in label_vecs.iter().enumerate() {
            let sim = cosine_similarity(&question_vec, label_vec);
            if best.map_or(true, |(_, b)| sim > b) {
                best = Some((i, sim));
            }
        }
        let resolved = best.and_then(|(i, _)| candidates.get(i).cloned());
        tracing::debug!(?resolved, candidates = candidates.len(), "topic resolved");
        Ok(resolved)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}
