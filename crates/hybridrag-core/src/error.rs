use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The vector store could not be reached or the collection is missing.
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("Unrecognized retrieval mode '{0}' (expected standard, hybrid, iterative, iterative:standard or iterative:hybrid)")]
    InvalidModeSelection(String),

    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Lexical index failed: {0}")]
    LexicalIndex(String),
}

pub type Result<T> = std::result::Result<T, Error>;
