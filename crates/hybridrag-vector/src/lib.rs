//! hybridrag-vector
//!
//! Dense side of retrieval: a LanceDB-backed collection (`LanceStore`) and an
//! in-memory equivalent (`MemoryStore`), both serving `DenseIndex` and
//! `VectorIndexer` from `hybridrag-core`.

pub mod memory;
pub mod schema;
pub mod search;
pub mod store;
pub mod table;
pub mod writer;

pub use memory::MemoryStore;
pub use store::LanceStore;
