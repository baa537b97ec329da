use hybridrag_core::data_processor::DataProcessor;
use hybridrag_core::error::Error;
use hybridrag_core::traits::{DenseIndex, Embedder, VectorIndexer};
use hybridrag_core::types::{EmbedRole, Passage};
use hybridrag_embed::FakeEmbedder;
use hybridrag_vector::LanceStore;
use tempfile::TempDir;

const DIM: usize = 64;

fn write_corpus(dir: &std::path::Path) {
	std::fs::create_dir_all(dir.join("billing")).unwrap();
	std::fs::create_dir_all(dir.join("technical")).unwrap();
	std::fs::write(dir.join("billing/refunds.txt"), "refund policy allows returns within 30 days\n\ninvoices are emailed monthly").unwrap();
	std::fs::write(dir.join("technical/router.txt"), "restart the router to reset the connection").unwrap();
}

fn indexed_store(tmp: &TempDir) -> LanceStore {
	let data_dir = tmp.path().join("txt");
	write_corpus(&data_dir);
	let passages = DataProcessor::new().process_directory(&data_dir, None, None).expect("process");
	assert_eq!(passages.len(), 3);

	let embedder = FakeEmbedder::new(DIM);
	let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
	let embeddings = embedder.embed_as(EmbedRole::Passage, &texts).expect("embed");
	let store = LanceStore::open(&tmp.path().join("lancedb"), "documents_test", DIM).expect("open");
	store.index(&passages, &embeddings).expect("index");
	store
}

#[test]
fn lancedb_full_flow() {
	let tmp = TempDir::new().expect("tmp");
	let store = indexed_store(&tmp);
	assert!(store.exists().unwrap());
	assert_eq!(store.count().unwrap(), 3);

	let embedder = FakeEmbedder::new(DIM);
	let query = embedder.embed_as(EmbedRole::Query, &["refund policy".to_string()]).unwrap().remove(0);
	let hits = store.search(&query, 3, None).expect("search");
	assert_eq!(hits.len(), 3);
	for pair in hits.windows(2) {
		assert!(pair[0].score >= pair[1].score);
	}
	assert!(hits.iter().all(|h| h.score <= 1.0 + 1e-5));
	assert!(!hits[0].text.trim().is_empty());

	let technical = store.search(&query, 3, Some("technical")).expect("filtered search");
	assert_eq!(technical.len(), 1);
	assert_eq!(technical[0].id, "technical_router:0");
	assert_eq!(technical[0].topic.as_deref(), Some("technical"));
}

#[test]
fn scroll_and_topics_read_back_payloads() {
	let tmp = TempDir::new().expect("tmp");
	let store = indexed_store(&tmp);

	let all = store.scroll(10, None).unwrap();
	assert_eq!(all.len(), 3);
	let billing = store.scroll(10, Some("billing")).unwrap();
	let mut ids: Vec<String> = billing.iter().map(|p| p.id.clone()).collect();
	ids.sort();
	assert_eq!(ids, ["billing_refunds:0", "billing_refunds:1"]);
	assert_eq!(store.scroll(1, None).unwrap().len(), 1);
	assert_eq!(store.topics().unwrap(), ["billing", "technical"]);
}

#[test]
fn reindexing_replaces_rows_with_the_same_id() {
	let tmp = TempDir::new().expect("tmp");
	let store = LanceStore::open(tmp.path(), "reingest", 2).expect("open");
	store.index(&[Passage::new("a:0", "first draft", None), Passage::new("b:0", "other", None)], &[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
	store.index(&[Passage::new("a:0", "second draft", Some("notes"))], &[vec![1.0, 0.0]]).unwrap();

	assert_eq!(store.count().unwrap(), 2);
	let mut passages = store.scroll(10, None).unwrap();
	passages.sort_by(|a, b| a.id.cmp(&b.id));
	assert_eq!(passages[0], Passage::new("a:0", "second draft", Some("notes")));
	assert_eq!(passages[1].id, "b:0");
}

#[test]
fn untopiced_passages_round_trip_as_none() {
	let tmp = TempDir::new().expect("tmp");
	let store = LanceStore::open(tmp.path(), "plain", 2).expect("open");
	store.index(&[Passage::new("p", "plain text", None)], &[vec![1.0, 0.0]]).unwrap();
	let passages = store.scroll(5, None).unwrap();
	assert_eq!(passages, vec![Passage::new("p", "plain text", None)]);
	assert!(store.topics().unwrap().is_empty());
}

#[test]
fn missing_collection_is_unavailable() {
	let tmp = TempDir::new().expect("tmp");
	let store = LanceStore::open(tmp.path(), "never_written", 4).expect("open");
	assert!(!store.exists().unwrap());
	let err = store.search(&[0.0, 1.0, 0.0, 0.0], 5, None).unwrap_err();
	assert!(matches!(err, Error::RetrievalUnavailable(_)), "got {err:?}");
	assert!(matches!(store.scroll(5, None), Err(Error::RetrievalUnavailable(_))));
}

#[test]
fn ensure_collection_creates_empty_table() {
	let tmp = TempDir::new().expect("tmp");
	let store = LanceStore::open(tmp.path(), "empty", 4).expect("open");
	store.ensure_collection().unwrap();
	assert!(store.exists().unwrap());
	assert_eq!(store.count().unwrap(), 0);
	assert!(store.scroll(10, None).unwrap().is_empty());
	store.ensure_collection().unwrap();
}

#[test]
fn wrong_dimension_is_rejected() {
	let tmp = TempDir::new().expect("tmp");
	let store = LanceStore::open(tmp.path(), "dims", 4).expect("open");
	let err = store.index(&[Passage::new("p", "x", None)], &[vec![1.0, 0.0]]).unwrap_err();
	assert!(matches!(err, Error::InvalidRequest(_)));
}
