use std::sync::Arc;

use hybridrag_core::error::Result;
use hybridrag_core::traits::{DenseIndex, Embedder, Retriever};
use hybridrag_core::types::Document;

use crate::retriever::embed_query;

/// Dense-only retrieval: top `top_k` hits straight from the store.
pub struct StandardRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DenseIndex>,
    top_k: usize,
}

impl StandardRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn DenseIndex>, top_k: usize) -> Self {
        Self { embedder, store, top_k }
    }
}

impl Retriever for StandardRetriever {
    fn retrieve(&self, query: &str, topic: Option<&str>) -> Result<Vec<Document>> {
        if self.top_k == 0 {
            return Ok(vec![]);
        }
        let query_vec = embed_query(self.embedder.as_ref(), query)?;
        let hits = self.store.search(&query_vec, self.top_k, topic)?;
        tracing::debug!(hits = hits.len(), ?topic, "dense retrieval");
        Ok(hits.into_iter().take(self.top_k).map(Document::from).collect())
    }
}
