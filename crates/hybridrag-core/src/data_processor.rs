//! Plain-text ingestion: walks a directory of `.txt` files and cuts them into
//! passages ready to be embedded.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Passage;

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub max_tokens: usize,
    pub words_per_chunk: usize,
    pub overlap_percent: f32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_tokens: 500, words_per_chunk: 300, overlap_percent: 0.2 }
    }
}

#[derive(Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(chunking_config: ChunkingConfig) -> Self {
        Self { chunking_config }
    }

    /// Chunks every `.txt` file under `data_dir`, at most `limit` files when given.
    ///
    /// With `topic` unset, each file's topic is its parent directory relative
    /// to `data_dir`; files directly under `data_dir` carry no topic.
    pub fn process_directory(&self, data_dir: &Path, topic: Option<&str>, limit: Option<usize>) -> Result<Vec<Passage>> {
        let mut files = self.list_txt_files(data_dir);
        if files.is_empty() {
            tracing::warn!(dir = %data_dir.display(), "no .txt files found");
            return Ok(vec![]);
        }
        if let Some(limit) = limit {
            if files.len() > limit {
                files.truncate(limit);
                tracing::info!(limit, "limited to first files");
            }
        }
        let mut all_passages = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!(file = %file_path.display(), index = file_index + 1, total = files.len(), "processing file");
            let content = self.read_file_content(file_path)?;
            let doc_id = self.extract_doc_id(file_path, data_dir)?;
            let file_topic = match topic {
                Some(t) => Some(sanitize_topic(t)),
                None => self.topic_from_path(file_path, data_dir),
            };
            all_passages.extend(self.chunk_content(&content, &doc_id, file_topic.as_deref()));
        }
        tracing::info!(files = files.len(), passages = all_passages.len(), "processed directory");
        Ok(all_passages)
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        let bytes = fs::read(file_path).map_err(|e| Error::NotFound(format!("{}: {e}", file_path.display())))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// The file's path relative to `data_dir`, extension dropped and separators
    /// flattened: `billing/faq.txt` becomes `billing_faq`.
    fn extract_doc_id(&self, file_path: &Path, data_dir: &Path) -> Result<String> {
        let relative_path = file_path.strip_prefix(data_dir).unwrap_or(file_path);
        if relative_path.file_stem().is_none() {
            return Err(Error::InvalidRequest(format!("no file name in {}", file_path.display())));
        }
        Ok(sanitize_topic(&relative_path.with_extension("").to_string_lossy()))
    }

    fn topic_from_path(&self, file_path: &Path, data_dir: &Path) -> Option<String> {
        let relative_path = file_path.strip_prefix(data_dir).unwrap_or(file_path);
        let parent = relative_path.parent()?.to_str()?;
        if parent.is_empty() {
            return None;
        }
        Some(sanitize_topic(parent))
    }

    /// Paragraphs (blank-line separated) become passages; oversized paragraphs
    /// are split into overlapping word windows. Ids are `<doc_id>:<index>`.
    pub fn chunk_content(&self, content: &str, doc_id: &str, topic: Option<&str>) -> Vec<Passage> {
        let mut passages = Vec::new();
        for paragraph in content.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            if self.count_tokens(paragraph) <= self.chunking_config.max_tokens {
                passages.push(Passage::new(format!("{doc_id}:{}", passages.len()), paragraph, topic));
            } else {
                for sub_chunk in self.split_paragraph_with_overlap(paragraph) {
                    passages.push(Passage::new(format!("{doc_id}:{}", passages.len()), sub_chunk, topic));
                }
            }
        }
        passages
    }

    fn count_tokens(&self, text: &str) -> usize {
        let word_count = text.split_whitespace().count();
        (word_count as f32 / 0.75) as usize
    }

    fn split_paragraph_with_overlap(&self, paragraph: &str) -> Vec<String> {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        let words_per_chunk = self.chunking_config.words_per_chunk.max(1);
        let overlap_words = ((words_per_chunk as f32 * self.chunking_config.overlap_percent) as usize).min(words_per_chunk - 1);
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + words_per_chunk).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end >= words.len() {
                break;
            }
            start = end - overlap_words;
        }
        chunks
    }

    fn list_txt_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("txt"))
            .map(|e| e.path().to_path_buf())
            .collect();
        txt_files.sort();
        txt_files
    }
}

/// Topic labels never contain path separators.
pub fn sanitize_topic(topic: &str) -> String {
    topic.replace(['/', '\\'], "_")
}
