use std::sync::Arc;
use std::time::{Duration, Instant};

use hybridrag_core::config::{AppConfig, RetrievalConfig};
use hybridrag_core::error::{Error, Result};
use hybridrag_core::traits::{AnswerGenerator, DenseIndex, Embedder, FollowUpOracle, Retriever, TopicResolver};
use hybridrag_core::types::Document;
use hybridrag_hybrid::{HybridRetriever, StandardRetriever};

use crate::memory::ConversationMemory;
use crate::refinement::RefinementLoop;
use crate::strategy::{RetrieverKind, Strategy};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub answer: String,
    pub topic: Option<String>,
    pub elapsed: Duration,
    pub rounds: usize,
    pub strategy: Strategy,
}

/// Entry point for question answering over one collection.
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DenseIndex>,
    resolver: Arc<dyn TopicResolver>,
    generator: Arc<dyn AnswerGenerator>,
    oracle: Arc<dyn FollowUpOracle>,
    retrieval: RetrievalConfig,
    scroll_limit: usize,
    max_iterations: usize,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DenseIndex>,
        resolver: Arc<dyn TopicResolver>,
        generator: Arc<dyn AnswerGenerator>,
        oracle: Arc<dyn FollowUpOracle>,
        config: &AppConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            embedder,
            store,
            resolver,
            generator,
            oracle,
            retrieval: config.retrieval.clone(),
            scroll_limit: config.store.scroll_limit,
            max_iterations: config.refinement.max_iterations,
        })
    }

    pub fn build_retriever(&self, kind: RetrieverKind) -> Result<Box<dyn Retriever>> {
        Ok(match kind {
            RetrieverKind::Standard => {
                Box::new(StandardRetriever::new(self.embedder.clone(), self.store.clone(), self.retrieval.top_k))
            }
            RetrieverKind::Hybrid => Box::new(
                HybridRetriever::new(self.embedder.clone(), self.store.clone(), &self.retrieval)?
                    .with_scroll_limit(self.scroll_limit),
            ),
        })
    }

    /// Picks one of the collection's topic labels for `question`.
    pub fn resolve_topic(&self, question: &str) -> Result<Option<String>> {
        let candidates = self.store.topics()?;
        let topic = self.resolver.resolve(question, &candidates)?;
        tracing::info!(?topic, candidates = candidates.len(), "topic detection");
        Ok(topic)
    }

    /// Parses `tag` before doing any work, then answers as [`Self::ask`].
    pub fn ask_tagged(
        &self,
        question: &str,
        tag: &str,
        detect_topic: bool,
        memory: Option<&mut ConversationMemory>,
    ) -> Result<QueryOutcome> {
        let strategy: Strategy = tag.parse()?;
        self.ask(question, strategy, detect_topic, memory)
    }

    pub fn ask(
        &self,
        question: &str,
        strategy: Strategy,
        detect_topic: bool,
        mut memory: Option<&mut ConversationMemory>,
    ) -> Result<QueryOutcome> {
        validate_question(question)?;
        let start = Instant::now();
        let topic = if detect_topic { self.resolve_topic(question)? } else { None };
        let retriever = self.build_retriever(strategy.retriever_kind())?;
        let history = memory.as_deref().map(ConversationMemory::turns);

        let (answer, rounds) = match strategy {
            Strategy::Standard | Strategy::Hybrid => {
                let docs = retriever.retrieve(question, topic.as_deref())?;
                (self.generator.generate(question, &docs, history)?, 1)
            }
            Strategy::Iterative(_) => {
                let outcome = RefinementLoop::new(Some(retriever.as_ref()), self.generator.as_ref(), self.oracle.as_ref(), self.max_iterations)?
                    .with_history(history)
                    .run(question, topic.clone())?;
                (outcome.final_answer, outcome.rounds_performed)
            }
        };

        if let Some(memory) = memory.as_deref_mut() {
            memory.push(question, answer.clone());
        }
        let elapsed = start.elapsed();
        tracing::info!(%strategy, ?topic, rounds, ?elapsed, "question answered");
        Ok(QueryOutcome { answer, topic, elapsed, rounds, strategy })
    }

    /// Ranked documents only, no generation.
    pub fn retrieve_only(&self, question: &str, kind: RetrieverKind, detect_topic: bool) -> Result<Vec<Document>> {
        validate_question(question)?;
        let topic = if detect_topic { self.resolve_topic(question)? } else { None };
        self.build_retriever(kind)?.retrieve(question, topic.as_deref())
    }
}

fn validate_question(question: &str) -> Result<()> {
    if question.trim().is_empty() {
        return Err(Error::InvalidRequest("question must not be empty".to_string()));
    }
    Ok(())
}
