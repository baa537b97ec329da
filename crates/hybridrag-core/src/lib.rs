//! hybridrag-core
//!
//! Shared vocabulary for the retrieval workspace: the error enum, document and
//! hit types, the collaborator traits every engine implements, figment-backed
//! configuration, and the plain-text chunker used by ingestion.

pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
