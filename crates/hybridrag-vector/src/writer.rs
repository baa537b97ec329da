use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use std::sync::Arc;

use hybridrag_core::error::{Error, Result};
use hybridrag_core::traits::VectorIndexer;
use hybridrag_core::types::Passage;

use crate::schema::build_arrow_schema;
use crate::store::{unavailable, LanceStore};
use crate::table::id_filter;

const BATCH_SIZE: usize = 1000;

impl LanceStore {
	async fn insert_batch(&self, passages: &[Passage], embeddings: &[Vec<f32>]) -> lancedb::Result<()> {
		let record_batch = passages_to_record_batch(passages, embeddings, self.dim)?;
		let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		if self.db.table_names().execute().await?.contains(&self.table_name) {
			let table = self.db.open_table(&self.table_name).execute().await?;
			// re-ingesting a document replaces its rows
			table.delete(&id_filter(passages.iter().map(|p| p.id.as_str()))).await?;
			table.add(reader).execute().await?;
		} else {
			self.db.create_table(&self.table_name, reader).execute().await?;
		}
		Ok(())
	}
}

impl VectorIndexer for LanceStore {
	fn index(&self, passages: &[Passage], embeddings: &[Vec<f32>]) -> Result<()> {
		if passages.len() != embeddings.len() {
			return Err(Error::InvalidRequest(format!("{} passages but {} embeddings", passages.len(), embeddings.len())));
		}
		if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dim) {
			return Err(Error::InvalidRequest(format!("embedding has {} dimensions, collection expects {}", bad.len(), self.dim)));
		}
		if passages.is_empty() {
			return Ok(());
		}
		for (chunk, vecs) in passages.chunks(BATCH_SIZE).zip(embeddings.chunks(BATCH_SIZE)) {
			self.block_on(self.insert_batch(chunk, vecs)).map_err(unavailable)?;
			tracing::debug!(rows = chunk.len(), table = %self.table_name, "inserted batch");
		}
		tracing::info!(rows = passages.len(), table = %self.table_name, "indexed passages");
		Ok(())
	}
}

fn passages_to_record_batch(passages: &[Passage], embeddings: &[Vec<f32>], dim: usize) -> lancedb::Result<RecordBatch> {
	let ids: Vec<String> = passages.iter().map(|p| p.id.clone()).collect();
	let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
	let topics: Vec<Option<String>> = passages.iter().map(|p| p.topic.clone()).collect();
	let vectors = embeddings.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect::<Vec<_>>()));
	let record_batch = RecordBatch::try_new(
		build_arrow_schema(dim),
		vec![
			Arc::new(StringArray::from(ids)),
			Arc::new(StringArray::from(texts)),
			Arc::new(StringArray::from(topics)),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors, dim as i32)),
		],
	)?;
	Ok(record_batch)
}
