use std::collections::BTreeSet;
use std::sync::RwLock;

use hybridrag_core::error::{Error, Result};
use hybridrag_core::traits::{DenseIndex, VectorIndexer};
use hybridrag_core::types::{Passage, SearchHit, SourceKind};
use hybridrag_embed::cosine_similarity;

/// Brute-force in-process collection. Same contract as [`crate::LanceStore`]
/// with exact cosine scoring.
#[derive(Default)]
pub struct MemoryStore {
	rows: RwLock<Vec<(Passage, Vec<f32>)>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.rows.read().map(|r| r.len()).unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

fn poisoned<T>(_: T) -> Error {
	Error::RetrievalUnavailable("memory store lock poisoned".to_string())
}

fn topic_matches(passage: &Passage, topic: Option<&str>) -> bool {
	topic.map_or(true, |t| passage.topic.as_deref() == Some(t))
}

impl DenseIndex for MemoryStore {
	fn search(&self, query_vec: &[f32], top_n: usize, topic: Option<&str>) -> Result<Vec<SearchHit>> {
		let rows = self.rows.read().map_err(poisoned)?;
		let mut hits: Vec<SearchHit> = rows
			.iter()
			.filter(|(p, _)| topic_matches(p, topic))
			.map(|(p, v)| SearchHit {
				id: p.id.clone(),
				text: p.text.clone(),
				topic: p.topic.clone(),
				score: cosine_similarity(query_vec, v),
				source: SourceKind::Vector,
			})
			.collect();
		hits.sort_by(|a, b| b.score.total_cmp(&a.score));
		hits.truncate(top_n);
		Ok(hits)
	}

	fn scroll(&self, limit: usize, topic: Option<&str>) -> Result<Vec<Passage>> {
		let rows = self.rows.read().map_err(poisoned)?;
		Ok(rows.iter().filter(|(p, _)| topic_matches(p, topic)).take(limit).map(|(p, _)| p.clone()).collect())
	}

	fn topics(&self) -> Result<Vec<String>> {
		let rows = self.rows.read().map_err(poisoned)?;
		let topics: BTreeSet<String> = rows.iter().filter_map(|(p, _)| p.topic.clone()).collect();
		Ok(topics.into_iter().collect())
	}
}

impl VectorIndexer for MemoryStore {
	fn index(&self, passages: &[Passage], embeddings: &[Vec<f32>]) -> Result<()> {
		if passages.len() != embeddings.len() {
			return Err(Error::InvalidRequest(format!("{} passages but {} embeddings", passages.len(), embeddings.len())));
		}
		let mut rows = self.rows.write().map_err(poisoned)?;
		rows.retain(|(p, _)| !passages.iter().any(|n| n.id == p.id));
		rows.extend(passages.iter().cloned().zip(embeddings.iter().cloned()));
		Ok(())
	}
}
