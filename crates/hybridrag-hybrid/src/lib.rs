//! hybridrag-hybrid
//!
//! Retrievers over the dense store: `HybridRetriever` fuses dense similarity
//! with BM25 over a per-call corpus snapshot, `StandardRetriever` is dense only.

pub mod fusion;
pub mod retriever;
pub mod standard;

pub use fusion::{fuse, FusionCandidate};
pub use retriever::HybridRetriever;
pub use standard::StandardRetriever;
