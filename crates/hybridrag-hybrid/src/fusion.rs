//! Weighted-sum fusion of the dense and lexical signals.
//!
//! Each signal is min-max normalised over its own candidates for the current
//! query, then `combined = alpha * dense + (1 - alpha) * lexical`. A document
//! missing from one signal scores 0 for it.

use std::collections::{HashMap, HashSet};

use hybridrag_core::types::{DocId, Document, SearchHit};

#[derive(Debug, Clone, PartialEq)]
pub struct FusionCandidate {
    pub id: DocId,
    pub text: String,
    pub topic: Option<String>,
    pub dense_score: f32,
    pub lexical_score: f32,
    pub combined_score: f32,
}

/// Ranks the union of `dense` and `lexical` and keeps the best `top_k`.
///
/// Merge order is dense rank order followed by lexical-only hits in the order
/// given; equal combined scores keep that order.
pub fn fuse(dense: &[SearchHit], lexical: &[SearchHit], top_k: usize, alpha: f32) -> Vec<Document> {
    if top_k == 0 {
        return vec![];
    }
    let mut candidates = merge(dense, lexical);
    for c in &mut candidates {
        c.combined_score = alpha * c.dense_score + (1.0 - alpha) * c.lexical_score;
    }
    candidates.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
    candidates.truncate(top_k);
    candidates
        .into_iter()
        .map(|c| Document { id: c.id, text: c.text, topic: c.topic, score: c.combined_score })
        .collect()
}

/// Union of both signals with normalised per-signal scores, in merge order.
pub fn merge(dense: &[SearchHit], lexical: &[SearchHit]) -> Vec<FusionCandidate> {
    let dense = first_by_id(dense);
    let lexical = first_by_id(lexical);
    let dense_norm = min_max(&dense.iter().map(|h| h.score).collect::<Vec<_>>());
    let lexical_norm = min_max(&lexical.iter().map(|h| h.score).collect::<Vec<_>>());

    let mut candidates: Vec<FusionCandidate> = Vec::with_capacity(dense.len() + lexical.len());
    let mut slot: HashMap<&str, usize> = HashMap::with_capacity(dense.len() + lexical.len());
    for (hit, score) in dense.iter().zip(dense_norm) {
        slot.insert(hit.id.as_str(), candidates.len());
        candidates.push(FusionCandidate {
            id: hit.id.clone(),
            text: hit.text.clone(),
            topic: hit.topic.clone(),
            dense_score: score,
            lexical_score: 0.0,
            combined_score: 0.0,
        });
    }
    for (hit, score) in lexical.iter().zip(lexical_norm) {
        match slot.get(hit.id.as_str()) {
            Some(&i) => {
                let c = &mut candidates[i];
                c.lexical_score = score;
                if c.topic.is_none() {
                    c.topic = hit.topic.clone();
                }
            }
            None => {
                slot.insert(hit.id.as_str(), candidates.len());
                candidates.push(FusionCandidate {
                    id: hit.id.clone(),
                    text: hit.text.clone(),
                    topic: hit.topic.clone(),
                    dense_score: 0.0,
                    lexical_score: score,
                    combined_score: 0.0,
                });
            }
        }
    }
    candidates
}

fn first_by_id(hits: &[SearchHit]) -> Vec<&SearchHit> {
    let mut seen = HashSet::with_capacity(hits.len());
    hits.iter().filter(|h| seen.insert(h.id.as_str())).collect()
}

/// `(s - min) / (max - min)`; a flat signal maps to 1.0 when positive, else 0.0.
pub fn min_max(scores: &[f32]) -> Vec<f32> {
    let (min, max) = scores.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    let range = max - min;
    scores
        .iter()
        .map(|&s| {
            if range > 0.0 {
                (s - min) / range
            } else if s > 0.0 {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}
