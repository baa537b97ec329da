//! Iterative retrieve → generate → decide loop.
//!
//! One [`RefinementState`] is created per call and threaded through
//! [`RefinementLoop::step`] until it reports [`Step::Done`]. Each step is one
//! full round ending in a follow-up decision; the round cap overrides a
//! request to continue.

use std::time::{Duration, Instant};

use hybridrag_core::error::{Error, Result};
use hybridrag_core::traits::{AnswerGenerator, FollowUpOracle, Retriever};
use hybridrag_core::types::{Document, FollowUp, Turn};

pub const NO_RETRIEVER_ANSWER: &str = "No retriever provided";

#[derive(Debug, Clone, PartialEq)]
pub struct RefinementState {
    pub current_question: String,
    /// Every document retrieved so far, duplicates included.
    pub accumulated_context: Vec<Document>,
    pub round_count: usize,
    pub final_answer: Option<String>,
}

impl RefinementState {
    pub fn new(question: impl Into<String>) -> Self {
        Self { current_question: question.into(), accumulated_context: Vec::new(), round_count: 0, final_answer: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Continue(RefinementState),
    Done(RefinementState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefinementOutcome {
    pub final_answer: String,
    pub resolved_topic: Option<String>,
    pub elapsed: Duration,
    pub rounds_performed: usize,
}

pub struct RefinementLoop<'a> {
    retriever: Option<&'a dyn Retriever>,
    generator: &'a dyn AnswerGenerator,
    oracle: &'a dyn FollowUpOracle,
    max_iterations: usize,
    history: Option<&'a [Turn]>,
}

impl<'a> RefinementLoop<'a> {
    pub fn new(
        retriever: Option<&'a dyn Retriever>,
        generator: &'a dyn AnswerGenerator,
        oracle: &'a dyn FollowUpOracle,
        max_iterations: usize,
    ) -> Result<Self> {
        if max_iterations == 0 {
            return Err(Error::InvalidConfig("max_iterations must be at least 1".to_string()));
        }
        Ok(Self { retriever, generator, oracle, max_iterations, history: None })
    }

    /// Earlier conversation turns handed to the generator every round.
    pub fn with_history(mut self, history: Option<&'a [Turn]>) -> Self {
        self.history = history;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Runs one round on `state`.
    pub fn step(&self, mut state: RefinementState, topic: Option<&str>) -> Result<Step> {
        let Some(retriever) = self.retriever else {
            return Ok(Step::Done(state));
        };
        if state.round_count >= self.max_iterations {
            return Ok(Step::Done(state));
        }

        let docs = retriever.retrieve(&state.current_question, topic)?;
        tracing::debug!(round = state.round_count + 1, retrieved = docs.len(), question = %state.current_question, "refinement round");
        state.accumulated_context.extend(docs);

        let answer = self.generator.generate(&state.current_question, &state.accumulated_context, self.history)?;
        state.round_count += 1;

        let decision = self.oracle.decide(&state.current_question, &answer)?;
        state.final_answer = Some(answer);
        match decision {
            FollowUp::Done => Ok(Step::Done(state)),
            FollowUp::Ask(_) if state.round_count >= self.max_iterations => {
                tracing::debug!(rounds = state.round_count, "round cap reached, follow-up ignored");
                Ok(Step::Done(state))
            }
            FollowUp::Ask(next) => {
                state.current_question = next;
                Ok(Step::Continue(state))
            }
        }
    }

    /// Refines `question` until the oracle is satisfied or the round cap is hit.
    /// `topic` is the already resolved topic; it scopes every round.
    pub fn run(&self, question: &str, topic: Option<String>) -> Result<RefinementOutcome> {
        if self.retriever.is_none() {
            return Ok(RefinementOutcome {
                final_answer: NO_RETRIEVER_ANSWER.to_string(),
                resolved_topic: None,
                elapsed: Duration::ZERO,
                rounds_performed: 0,
            });
        }

        let start = Instant::now();
        let mut state = RefinementState::new(question);
        let state = loop {
            match self.step(state, topic.as_deref())? {
                Step::Continue(next) => state = next,
                Step::Done(done) => break done,
            }
        };
        let elapsed = start.elapsed();
        tracing::info!(rounds = state.round_count, context = state.accumulated_context.len(), ?elapsed, "refinement finished");
        Ok(RefinementOutcome {
            final_answer: state.final_answer.unwrap_or_default(),
            resolved_topic: topic,
            elapsed,
            rounds_performed: state.round_count,
        })
    }
}
