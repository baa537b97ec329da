mod common;

use std::sync::Arc;

use common::{CountingStore, ScriptedGenerator, ScriptedOracle};
use hybridrag_core::config::AppConfig;
use hybridrag_core::error::Error;
use hybridrag_core::traits::{Embedder, VectorIndexer};
use hybridrag_core::types::{EmbedRole, FollowUp, Passage};
use hybridrag_embed::{EmbeddingTopicResolver, FakeEmbedder};
use hybridrag_refine::{ConversationMemory, QueryPipeline, RetrieverKind, Strategy};

const DIM: usize = 1024;

struct Fixture {
    store: Arc<CountingStore>,
    generator: Arc<ScriptedGenerator>,
    oracle: Arc<ScriptedOracle>,
    pipeline: QueryPipeline,
}

fn fixture(config: AppConfig, oracle: ScriptedOracle) -> Fixture {
    let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::new(DIM));
    let store = Arc::new(CountingStore::default());
    let passages = [
        Passage::new("refunds:0", "refunds are issued within 30 days of the invoice", Some("billing")),
        Passage::new("plans:0", "the premium plan is billed monthly", Some("billing")),
        Passage::new("router:0", "restart the router when the connection drops", Some("technical")),
    ];
    let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
    store.inner.index(&passages, &embedder.embed_as(EmbedRole::Passage, &texts).unwrap()).unwrap();

    let generator = Arc::new(ScriptedGenerator::default());
    let oracle = Arc::new(oracle);
    let pipeline = QueryPipeline::new(
        embedder.clone(),
        store.clone(),
        Arc::new(EmbeddingTopicResolver::new(embedder)),
        generator.clone(),
        oracle.clone(),
        &config,
    )
    .unwrap();
    Fixture { store, generator, oracle, pipeline }
}

#[test]
fn unknown_tag_fails_before_store_access() {
    let f = fixture(AppConfig::default(), ScriptedOracle::default());
    let err = f.pipeline.ask_tagged("what is the refund window", "iterative:bm25", true, None).unwrap_err();
    assert!(matches!(err, Error::InvalidModeSelection(_)), "got {err:?}");
    assert_eq!(f.store.calls(), 0);
    assert!(f.generator.calls.lock().unwrap().is_empty());
}

#[test]
fn empty_question_is_invalid_request() {
    let f = fixture(AppConfig::default(), ScriptedOracle::default());
    let err = f.pipeline.ask("   ", Strategy::Hybrid, true, None).unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
    assert_eq!(f.store.calls(), 0);
}

#[test]
fn single_shot_strategies_generate_once() {
    let f = fixture(AppConfig::default(), ScriptedOracle::default());
    for tag in ["standard", "hybrid"] {
        let outcome = f.pipeline.ask_tagged("refund window", tag, false, None).unwrap();
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.topic, None);
        assert_eq!(outcome.strategy.to_string(), tag);
    }
    assert_eq!(f.oracle.calls(), 0);
    let calls = f.generator.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].context_len, 3, "standard returns every stored passage under top_k 5");
}

#[test]
fn iterative_strategy_runs_the_loop() {
    let mut config = AppConfig::default();
    config.refinement.max_iterations = 2;
    let f = fixture(config, ScriptedOracle::default());
    let outcome = f.pipeline.ask("why was I charged twice", Strategy::Iterative(RetrieverKind::Hybrid), false, None).unwrap();
    assert_eq!(outcome.rounds, 2);
    assert_eq!(outcome.answer, "answer 2");
    assert_eq!(f.oracle.calls(), 2);
}

#[test]
fn iterative_stops_when_oracle_is_satisfied() {
    let f = fixture(AppConfig::default(), ScriptedOracle::with_replies([FollowUp::Done]));
    let outcome = f.pipeline.ask_tagged("refund window", "iterative:standard", false, None).unwrap();
    assert_eq!(outcome.rounds, 1);
    assert_eq!(outcome.strategy, Strategy::Iterative(RetrieverKind::Standard));
}

#[test]
fn memory_feeds_history_and_records_turns() {
    let f = fixture(AppConfig::default(), ScriptedOracle::default());
    let mut memory = ConversationMemory::new(8);
    f.pipeline.ask("refund window", Strategy::Standard, false, Some(&mut memory)).unwrap();
    f.pipeline.ask("and for the premium plan", Strategy::Standard, false, Some(&mut memory)).unwrap();

    let history_lens: Vec<usize> = f.generator.calls.lock().unwrap().iter().map(|c| c.history_len).collect();
    assert_eq!(history_lens, [0, 1]);
    assert_eq!(memory.len(), 2);
    assert_eq!(memory.turns()[0].question, "refund window");
    assert_eq!(memory.turns()[0].answer, "answer 1");
}

#[test]
fn billing_question_is_scoped_to_billing() {
    let f = fixture(AppConfig::default(), ScriptedOracle::default());
    let question = "billing invoice refund for last month";

    let docs = f.pipeline.retrieve_only(question, RetrieverKind::Standard, true).unwrap();
    assert_eq!(docs.len(), 2);
    assert!(docs.iter().all(|d| d.topic.as_deref() == Some("billing")));

    let outcome = f.pipeline.ask(question, Strategy::Hybrid, true, None).unwrap();
    assert_eq!(outcome.topic.as_deref(), Some("billing"));
}

#[test]
fn detection_off_searches_everything() {
    let f = fixture(AppConfig::default(), ScriptedOracle::default());
    let docs = f.pipeline.retrieve_only("restart the router", RetrieverKind::Hybrid, false).unwrap();
    assert_eq!(docs.len(), 3);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = AppConfig::default();
    config.refinement.max_iterations = 0;
    let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::new(8));
    let result = QueryPipeline::new(
        embedder.clone(),
        Arc::new(CountingStore::default()),
        Arc::new(EmbeddingTopicResolver::new(embedder)),
        Arc::new(ScriptedGenerator::default()),
        Arc::new(ScriptedOracle::default()),
        &config,
    );
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}
