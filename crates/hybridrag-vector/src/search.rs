use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::DistanceType;
use std::collections::BTreeSet;

use hybridrag_core::error::{Error, Result};
use hybridrag_core::traits::DenseIndex;
use hybridrag_core::types::{Passage, SearchHit, SourceKind};

use crate::store::{unavailable, LanceStore};
use crate::table::topic_filter;

impl LanceStore {
	async fn search_batches(&self, query_vec: &[f32], top_n: usize, topic: Option<&str>) -> lancedb::Result<Vec<RecordBatch>> {
		let table = self.db.open_table(&self.table_name).execute().await?;
		if top_n == 0 {
			return Ok(vec![]);
		}
		let mut query = table.vector_search(query_vec.to_vec())?.distance_type(DistanceType::Cosine).limit(top_n);
		if let Some(topic) = topic {
			query = query.only_if(topic_filter(topic));
		}
		query.execute().await?.try_collect().await
	}

	async fn scan_batches(&self, limit: Option<usize>, topic: Option<&str>) -> lancedb::Result<Vec<RecordBatch>> {
		let table = self.db.open_table(&self.table_name).execute().await?;
		// Plain queries carry a default row cap, so a full scan asks for every row.
		let limit = match limit {
			Some(limit) => limit,
			None => table.count_rows(None).await?,
		};
		if limit == 0 {
			return Ok(vec![]);
		}
		let mut query = table.query().limit(limit);
		if let Some(topic) = topic {
			query = query.only_if(topic_filter(topic));
		}
		query.execute().await?.try_collect().await
	}
}

impl DenseIndex for LanceStore {
	fn search(&self, query_vec: &[f32], top_n: usize, topic: Option<&str>) -> Result<Vec<SearchHit>> {
		if query_vec.len() != self.dim {
			return Err(Error::InvalidRequest(format!("query vector has {} dimensions, collection expects {}", query_vec.len(), self.dim)));
		}
		let batches = self.block_on(self.search_batches(query_vec, top_n, topic)).map_err(unavailable)?;
		let mut hits = Vec::new();
		for batch in &batches {
			let distances = batch
				.column_by_name("_distance")
				.and_then(|c| c.as_any().downcast_ref::<Float32Array>())
				.ok_or_else(|| unavailable("search result has no _distance column"))?;
			for (i, passage) in passages_in(batch)?.into_iter().enumerate() {
				hits.push(SearchHit {
					id: passage.id,
					text: passage.text,
					topic: passage.topic,
					score: 1.0 - distances.value(i),
					source: SourceKind::Vector,
				});
			}
		}
		tracing::debug!(hits = hits.len(), top_n, ?topic, "dense search");
		Ok(hits)
	}

	fn scroll(&self, limit: usize, topic: Option<&str>) -> Result<Vec<Passage>> {
		if limit == 0 {
			return Ok(vec![]);
		}
		let batches = self.block_on(self.scan_batches(Some(limit), topic)).map_err(unavailable)?;
		let mut passages = Vec::new();
		for batch in &batches {
			passages.extend(passages_in(batch)?);
		}
		passages.truncate(limit);
		Ok(passages)
	}

	fn topics(&self) -> Result<Vec<String>> {
		let batches = self.block_on(self.scan_batches(None, None)).map_err(unavailable)?;
		let mut topics = BTreeSet::new();
		for batch in &batches {
			topics.extend(passages_in(batch)?.into_iter().filter_map(|p| p.topic));
		}
		Ok(topics.into_iter().collect())
	}
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch
		.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<StringArray>())
		.ok_or_else(|| unavailable(format!("{name} column missing")))
}

fn passages_in(batch: &RecordBatch) -> Result<Vec<Passage>> {
	let ids = string_column(batch, "id")?;
	let texts = string_column(batch, "text")?;
	let topics = string_column(batch, "topic")?;
	Ok((0..batch.num_rows())
		.map(|i| Passage {
			id: ids.value(i).to_string(),
			text: texts.value(i).to_string(),
			topic: (!topics.is_null(i)).then(|| topics.value(i).to_string()),
		})
		.collect())
}
