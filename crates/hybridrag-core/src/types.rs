//! Domain types used by the text, vector and hybrid engines.

use serde::{Deserialize, Serialize};

pub type DocId = String;

/// A chunk of a source document as it is written to and read back from the
/// vector store.
///
/// - `id`: stable identifier, unique within a corpus snapshot
/// - `text`: the content body
/// - `topic`: optional label used to scope retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: DocId,
    pub text: String,
    pub topic: Option<String>,
}

impl Passage {
    pub fn new(id: impl Into<DocId>, text: impl Into<String>, topic: Option<&str>) -> Self {
        Self { id: id.into(), text: text.into(), topic: topic.map(str::to_string) }
    }
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Text,
}

/// The minimal surface returned by all engines.
///
/// `score` is engine-specific but higher is always better: the dense adapter
/// reports `1 - cosine_distance`, the lexical index reports BM25.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocId,
    pub text: String,
    pub topic: Option<String>,
    pub score: f32,
    pub source: SourceKind,
}

/// A retrieved document with the relevance attached for the current query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub text: String,
    pub topic: Option<String>,
    pub score: f32,
}

impl From<SearchHit> for Document {
    fn from(hit: SearchHit) -> Self {
        Self { id: hit.id, text: hit.text, topic: hit.topic, score: hit.score }
    }
}

/// Embedding-model prefix convention. Passages are embedded at ingestion with
/// `passage: `, questions at retrieval time with `query: `.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedRole {
    Query,
    Passage,
}

impl EmbedRole {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Query => "query: ",
            Self::Passage => "passage: ",
        }
    }

    pub fn apply(self, text: &str) -> String {
        format!("{}{}", self.prefix(), text)
    }
}

/// Which corpus the lexical signal is scored over when a topic is in effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexicalScope {
    /// The whole collection, even when dense search is topic-filtered.
    #[default]
    Corpus,
    /// Only passages carrying the resolved topic.
    Topic,
}

/// Verdict of the follow-up oracle for one refinement round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    Done,
    Ask(String),
}

/// One exchange kept in conversation memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}
