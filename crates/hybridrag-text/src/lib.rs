//! hybridrag-text
//!
//! Tantivy-backed lexical signal. A `LexicalIndex` is built in RAM from one
//! corpus snapshot and scores every passage of that snapshot with BM25.

pub mod tantivy_utils;
pub mod index;

pub use index::LexicalIndex;
