//! hybridrag-llm
//!
//! OpenAI-compatible chat client serving as both the answer generator and the
//! follow-up oracle of the refinement loop.

pub mod client;
pub mod prompt;

pub use client::{parse_chat_content, parse_follow_up, ChatClient};
