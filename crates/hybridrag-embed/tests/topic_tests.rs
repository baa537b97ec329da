use std::sync::{Arc, Mutex};

use hybridrag_core::error::Result;
use hybridrag_core::traits::{Embedder, TopicResolver};
use hybridrag_embed::{EmbeddingTopicResolver, FakeEmbedder};

fn resolver() -> EmbeddingTopicResolver {
    EmbeddingTopicResolver::new(Arc::new(FakeEmbedder::new(1024)))
}

#[test]
fn billing_question_resolves_to_billing() {
    let candidates = vec!["billing".to_string(), "technical".to_string()];
    let topic = resolver().resolve("billing invoice refund for last month", &candidates).unwrap();
    assert_eq!(topic.as_deref(), Some("billing"));
}

#[test]
fn resolves_to_exactly_one_candidate() {
    let candidates = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
    let topic = resolver().resolve("something unrelated entirely", &candidates).unwrap();
    assert!(topic.is_some_and(|t| candidates.contains(&t)));
}

#[test]
fn no_candidates_resolves_to_none() {
    assert_eq!(resolver().resolve("billing", &[]).unwrap(), None);
}

/// FakeEmbedder that keeps every text it embeds.
struct Recording {
    inner: FakeEmbedder,
    seen: Mutex<Vec<String>>,
}

impl Embedder for Recording {
    fn dim(&self) -> usize {
        self.inner.dim()
    }
    fn max_len(&self) -> usize {
        self.inner.max_len()
    }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.seen.lock().unwrap().extend(texts.iter().cloned());
        self.inner.embed_batch(texts)
    }
}

#[test]
fn question_is_a_query_and_labels_are_passages() {
    let embedder = Arc::new(Recording { inner: FakeEmbedder::new(64), seen: Mutex::new(vec![]) });
    let candidates = vec!["billing".to_string(), "technical".to_string()];
    EmbeddingTopicResolver::new(embedder.clone()).resolve("refund", &candidates).unwrap();
    assert_eq!(*embedder.seen.lock().unwrap(), ["query: refund", "passage: billing", "passage: technical"]);
}
