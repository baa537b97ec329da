use std::sync::Arc;

use hybridrag_core::config::{RetrievalConfig, StoreConfig};
use hybridrag_core::error::{Error, Result};
use hybridrag_core::traits::{DenseIndex, Embedder, Retriever};
use hybridrag_core::types::{Document, EmbedRole, LexicalScope};
use hybridrag_text::LexicalIndex;

use crate::fusion::fuse;

/// Dense search plus BM25 over a fresh corpus snapshot, fused per query.
pub struct HybridRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DenseIndex>,
    top_k: usize,
    alpha: f32,
    oversample: usize,
    lexical_scope: LexicalScope,
    scroll_limit: usize,
}

impl HybridRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn DenseIndex>, config: &RetrievalConfig) -> Result<Self> {
        if !config.alpha.is_finite() || !(0.0..=1.0).contains(&config.alpha) {
            return Err(Error::InvalidConfig(format!("alpha must be within [0, 1], got {}", config.alpha)));
        }
        if config.oversample == 0 {
            return Err(Error::InvalidConfig("oversample must be at least 1".to_string()));
        }
        Ok(Self {
            embedder,
            store,
            top_k: config.top_k,
            alpha: config.alpha,
            oversample: config.oversample,
            lexical_scope: config.lexical_scope,
            scroll_limit: StoreConfig::default().scroll_limit,
        })
    }

    /// Caps how many passages one corpus snapshot may pull from the store.
    pub fn with_scroll_limit(mut self, scroll_limit: usize) -> Self {
        self.scroll_limit = scroll_limit;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

impl Retriever for HybridRetriever {
    fn retrieve(&self, query: &str, topic: Option<&str>) -> Result<Vec<Document>> {
        if self.top_k == 0 {
            return Ok(vec![]);
        }
        let query_vec = embed_query(self.embedder.as_ref(), query)?;
        let dense = self.store.search(&query_vec, self.top_k.saturating_mul(self.oversample), topic)?;

        // Snapshot is rebuilt on every call so new ingestions are visible.
        let lexical_topic = match self.lexical_scope {
            LexicalScope::Corpus => None,
            LexicalScope::Topic => topic,
        };
        let corpus = self.store.scroll(self.scroll_limit, lexical_topic)?;
        let lexical = LexicalIndex::build(corpus)?.score(query)?;

        let docs = fuse(&dense, &lexical, self.top_k, self.alpha);
        tracing::debug!(dense = dense.len(), corpus = lexical.len(), returned = docs.len(), ?topic, "hybrid retrieval");
        Ok(docs)
    }
}

pub(crate) fn embed_query(embedder: &dyn Embedder, query: &str) -> Result<Vec<f32>> {
    embedder
        .embed_as(EmbedRole::Query, &[query.to_string()])?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Embedding("embedder returned no vector for the query".to_string()))
}
