use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, TextAnalyzer, WhitespaceTokenizer};
use tantivy::Index;

pub const LEXICAL_TOKENIZER: &str = "lexical_whitespace";

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let _id_field = schema_builder.add_text_field("id", STRING | STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(LEXICAL_TOKENIZER).set_index_option(IndexRecordOption::WithFreqs);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	let _text_field = schema_builder.add_text_field("text", text_options);
	schema_builder.build()
}

/// Case-insensitive whitespace split, no stemming and no stop words.
pub fn lexical_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(WhitespaceTokenizer::default()).filter(LowerCaser).build()
}

pub fn register_tokenizer(index: &Index) {
	index.tokenizers().register(LEXICAL_TOKENIZER, lexical_analyzer());
}

/// Tokens of `text` exactly as the index sees them.
pub fn tokenize(text: &str) -> Vec<String> {
	let mut analyzer = lexical_analyzer();
	let mut stream = analyzer.token_stream(text);
	let mut tokens = Vec::new();
	while stream.advance() {
		tokens.push(stream.token().text.clone());
	}
	tokens
}
