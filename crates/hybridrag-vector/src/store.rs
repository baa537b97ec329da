use lancedb::Connection;
use std::future::Future;
use std::path::Path;

use hybridrag_core::error::{Error, Result};

use crate::schema::build_arrow_schema;
use crate::table::{ensure_table, open_db, table_exists};

/// Handle on one LanceDB collection. Owns the tokio runtime its async calls are
/// driven on, so the sync `DenseIndex`/`VectorIndexer` traits can be served
/// from plain threads.
pub struct LanceStore {
	pub(crate) runtime: tokio::runtime::Runtime,
	pub(crate) db: Connection,
	pub(crate) table_name: String,
	pub(crate) dim: usize,
}

impl LanceStore {
	pub fn open(uri: &Path, table_name: &str, dim: usize) -> Result<Self> {
		let runtime = tokio::runtime::Runtime::new().map_err(unavailable)?;
		let db = runtime.block_on(open_db(uri.to_string_lossy().as_ref())).map_err(unavailable)?;
		tracing::debug!(uri = %uri.display(), table = table_name, "lancedb connected");
		Ok(Self { runtime, db, table_name: table_name.to_string(), dim })
	}

	pub fn table_name(&self) -> &str {
		&self.table_name
	}

	pub fn dim(&self) -> usize {
		self.dim
	}

	pub fn exists(&self) -> Result<bool> {
		self.block_on(table_exists(&self.db, &self.table_name)).map_err(unavailable)
	}

	/// Creates the collection with zero rows when it is missing.
	pub fn ensure_collection(&self) -> Result<()> {
		self.block_on(ensure_table(&self.db, &self.table_name, build_arrow_schema(self.dim))).map_err(unavailable)
	}

	pub fn count(&self) -> Result<usize> {
		self.block_on(async {
			let table = self.db.open_table(&self.table_name).execute().await?;
			table.count_rows(None).await
		})
		.map_err(unavailable)
	}

	pub(crate) fn block_on<F: Future>(&self, fut: F) -> F::Output {
		self.runtime.block_on(fut)
	}
}

pub(crate) fn unavailable(e: impl std::fmt::Display) -> Error {
	Error::RetrievalUnavailable(e.to_string())
}
