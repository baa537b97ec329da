//! hybridrag-refine
//!
//! Query orchestration: strategy selection, the iterative refinement loop and
//! the pipeline the CLI calls into.

pub mod memory;
pub mod pipeline;
pub mod refinement;
pub mod strategy;

pub use memory::ConversationMemory;
pub use pipeline::{QueryOutcome, QueryPipeline};
pub use refinement::{RefinementLoop, RefinementOutcome, RefinementState, Step, NO_RETRIEVER_ANSWER};
pub use strategy::{RetrieverKind, Strategy};
