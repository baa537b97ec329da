#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use hybridrag_core::error::{Error, Result};
use hybridrag_core::traits::{AnswerGenerator, DenseIndex, FollowUpOracle, Retriever};
use hybridrag_core::types::{Document, FollowUp, Passage, SearchHit, Turn};
use hybridrag_vector::MemoryStore;

pub fn doc(id: &str) -> Document {
    Document { id: id.to_string(), text: format!("text of {id}"), topic: None, score: 1.0 }
}

/// One fresh document per call; remembers every question and topic it saw.
#[derive(Default)]
pub struct CountingRetriever {
    pub calls: Mutex<Vec<(String, Option<String>)>>,
}

impl Retriever for CountingRetriever {
    fn retrieve(&self, query: &str, topic: Option<&str>) -> Result<Vec<Document>> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((query.to_string(), topic.map(str::to_string)));
        Ok(vec![doc(&format!("d{}", calls.len()))])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateCall {
    pub question: String,
    pub context_len: usize,
    pub history_len: usize,
}

/// Answers "answer N" for the N-th call.
#[derive(Default)]
pub struct ScriptedGenerator {
    pub calls: Mutex<Vec<GenerateCall>>,
    pub fail: bool,
}

impl AnswerGenerator for ScriptedGenerator {
    fn generate(&self, question: &str, context: &[Document], history: Option<&[Turn]>) -> Result<String> {
        if self.fail {
            return Err(Error::GenerationFailure("model unavailable".to_string()));
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push(GenerateCall {
            question: question.to_string(),
            context_len: context.len(),
            history_len: history.map_or(0, <[Turn]>::len),
        });
        Ok(format!("answer {}", calls.len()))
    }
}

/// Replays scripted decisions, then keeps asking "follow-up N".
#[derive(Default)]
pub struct ScriptedOracle {
    pub replies: Mutex<VecDeque<FollowUp>>,
    pub calls: AtomicUsize,
    /// 1-based call that returns an error instead of a decision.
    pub fail_on_call: Option<usize>,
}

impl ScriptedOracle {
    pub fn with_replies(replies: impl IntoIterator<Item = FollowUp>) -> Self {
        Self { replies: Mutex::new(replies.into_iter().collect()), ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FollowUpOracle for ScriptedOracle {
    fn decide(&self, _question: &str, _answer: &str) -> Result<FollowUp> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(n) {
            return Err(Error::GenerationFailure("follow-up model unavailable".to_string()));
        }
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_else(|| FollowUp::Ask(format!("follow-up {n}"))))
    }
}

/// MemoryStore that counts every read.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DenseIndex for CountingStore {
    fn search(&self, query_vec: &[f32], top_n: usize, topic: Option<&str>) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query_vec, top_n, topic)
    }
    fn scroll(&self, limit: usize, topic: Option<&str>) -> Result<Vec<Passage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.scroll(limit, topic)
    }
    fn topics(&self) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.topics()
    }
}
