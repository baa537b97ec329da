use crate::error::Result;
use crate::types::{Document, EmbedRole, FollowUp, Passage, SearchHit, Turn};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embeds `texts` after applying the role prefix the model was trained with.
    fn embed_as(&self, role: EmbedRole, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let prefixed: Vec<String> = texts.iter().map(|t| role.apply(t)).collect();
        self.embed_batch(&prefixed)
    }
}

/// Read side of the vector store.
pub trait DenseIndex: Send + Sync {
    /// Top `top_n` hits by similarity, restricted to `topic` when given.
    /// Scores are `1 - cosine_distance`.
    fn search(&self, query_vec: &[f32], top_n: usize, topic: Option<&str>) -> Result<Vec<SearchHit>>;
    /// Stored payloads in storage order, at most `limit` of them.
    fn scroll(&self, limit: usize, topic: Option<&str>) -> Result<Vec<Passage>>;
    /// Distinct topic labels present in the collection.
    fn topics(&self) -> Result<Vec<String>>;
}

/// Write side of the vector store.
pub trait VectorIndexer: Send + Sync {
    fn index(&self, passages: &[Passage], embeddings: &[Vec<f32>]) -> Result<()>;
}

pub trait Retriever: Send + Sync {
    fn retrieve(&self, query: &str, topic: Option<&str>) -> Result<Vec<Document>>;
}

pub trait TopicResolver: Send + Sync {
    /// Returns exactly one of `candidates`, or `None` when there is nothing to pick from.
    fn resolve(&self, question: &str, candidates: &[String]) -> Result<Option<String>>;
}

pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, question: &str, context: &[Document], history: Option<&[Turn]>) -> Result<String>;
}

pub trait FollowUpOracle: Send + Sync {
    fn decide(&self, question: &str, answer: &str) -> Result<FollowUp>;
}
