use std::collections::HashMap;

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, TantivyDocument, Term};

use hybridrag_core::error::{Error, Result};
use hybridrag_core::types::{Passage, SearchHit, SourceKind};

use crate::tantivy_utils::{build_schema, register_tokenizer, tokenize};

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// BM25 index over one corpus snapshot. Lives in RAM and is never updated;
/// build a new one to see new passages.
pub struct LexicalIndex {
	reader: IndexReader,
	id_field: Field,
	text_field: Field,
	corpus: Vec<Passage>,
}

impl LexicalIndex {
	pub fn build(corpus: Vec<Passage>) -> Result<Self> {
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let id_field = schema.get_field("id").map_err(lexical_err)?;
		let text_field = schema.get_field("text").map_err(lexical_err)?;

		let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES).map_err(lexical_err)?;
		for passage in &corpus {
			writer
				.add_document(doc!(id_field => passage.id.clone(), text_field => passage.text.clone()))
				.map_err(lexical_err)?;
		}
		writer.commit().map_err(lexical_err)?;
		let reader = index.reader().map_err(lexical_err)?;
		tracing::debug!(passages = corpus.len(), "lexical index built");
		Ok(Self { reader, id_field, text_field, corpus })
	}

	pub fn len(&self) -> usize {
		self.corpus.len()
	}

	pub fn is_empty(&self) -> bool {
		self.corpus.is_empty()
	}

	/// One hit per corpus passage, in corpus order. Passages sharing no term
	/// with the query score 0 rather than being dropped.
	pub fn score(&self, query_text: &str) -> Result<Vec<SearchHit>> {
		let terms = tokenize(query_text);
		let scores = if terms.is_empty() || self.corpus.is_empty() { HashMap::new() } else { self.bm25(&terms)? };
		Ok(self
			.corpus
			.iter()
			.map(|p| SearchHit {
				id: p.id.clone(),
				text: p.text.clone(),
				topic: p.topic.clone(),
				score: scores.get(&p.id).copied().unwrap_or(0.0),
				source: SourceKind::Text,
			})
			.collect())
	}

	fn bm25(&self, terms: &[String]) -> Result<HashMap<String, f32>> {
		let clauses: Vec<(Occur, Box<dyn Query>)> = terms
			.iter()
			.map(|t| {
				let term = Term::from_field_text(self.text_field, t);
				(Occur::Should, Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)) as Box<dyn Query>)
			})
			.collect();
		let query = BooleanQuery::new(clauses);
		let searcher = self.reader.searcher();
		let top_docs = searcher.search(&query, &TopDocs::with_limit(self.corpus.len())).map_err(lexical_err)?;
		let mut scores = HashMap::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr).map_err(lexical_err)?;
			if let Some(id) = doc.get_first(self.id_field).and_then(|v| v.as_str()) {
				scores.insert(id.to_string(), score);
			}
		}
		Ok(scores)
	}
}

fn lexical_err(e: impl std::fmt::Display) -> Error {
	Error::LexicalIndex(e.to_string())
}
