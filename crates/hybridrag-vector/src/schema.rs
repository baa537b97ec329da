use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Collection layout: one row per passage, `topic` nullable.
pub fn build_arrow_schema(dim: usize) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("text", DataType::Utf8, false),
		Field::new("topic", DataType::Utf8, true),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim as i32), true),
	]))
}
