//! Typed configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nesting, e.g. `APP_RETRIEVAL__ALPHA`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::LexicalScope;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub refinement: RefinementConfig,
    pub memory: MemoryConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub uri: String,
    pub table: String,
    /// Upper bound on passages pulled per corpus snapshot.
    pub scroll_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { uri: "./data/lancedb".to_string(), table: "documents".to_string(), scroll_limit: 10_000 }
    }
}

impl StoreConfig {
    pub fn path(&self) -> PathBuf {
        expand_path(&self.uri)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model_dir: Option<String>,
    pub dimension: usize,
    pub max_len: usize,
    /// Use the deterministic hash embedder instead of loading model weights.
    pub fake: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { model_dir: None, dimension: 1024, max_len: 512, fake: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Weight of the dense signal; the lexical signal gets `1 - alpha`.
    pub alpha: f32,
    /// Dense candidates requested per result slot.
    pub oversample: usize,
    pub lexical_scope: LexicalScope,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5, alpha: 0.5, oversample: 4, lexical_scope: LexicalScope::Corpus }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    pub max_iterations: usize,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self { max_iterations: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { capacity: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub path: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            path: "/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.0,
            timeout_ms: 60_000,
        }
    }
}

impl LlmConfig {
    /// `llm.api_key` when set, otherwise `OPENAI_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key.clone().filter(|k| !k.is_empty()).or_else(|| env::var("OPENAI_API_KEY").ok())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Loads `path` plus its environment overlay (`config.dev.toml` next to
    /// `config.toml` when `RUST_ENV=dev`). Missing files are skipped.
    pub fn load_from(path: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file(path));
        if let Some(overlay) = env_overlay(path, &env_name) {
            figment = figment.merge(Toml::file(overlay));
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config: AppConfig = figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        tracing::debug!(env = %env_name, path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let alpha = self.retrieval.alpha;
        if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
            return Err(Error::InvalidConfig(format!("retrieval.alpha must be within [0, 1], got {alpha}")));
        }
        if self.retrieval.oversample == 0 {
            return Err(Error::InvalidConfig("retrieval.oversample must be at least 1".to_string()));
        }
        if self.refinement.max_iterations == 0 {
            return Err(Error::InvalidConfig("refinement.max_iterations must be at least 1".to_string()));
        }
        if self.store.scroll_limit == 0 {
            return Err(Error::InvalidConfig("store.scroll_limit must be at least 1".to_string()));
        }
        if self.store.table.trim().is_empty() {
            return Err(Error::InvalidConfig("store.table must not be empty".to_string()));
        }
        if self.embedding.dimension == 0 {
            return Err(Error::InvalidConfig("embedding.dimension must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn env_overlay(path: &Path, env_name: &str) -> Option<PathBuf> {
    let suffix = match env_name {
        "dev" | "development" => "dev",
        "prod" | "production" => "prod",
        "test" | "testing" => "test",
        _ => return None,
    };
    let stem = path.file_stem()?.to_string_lossy();
    Some(path.with_file_name(format!("{stem}.{suffix}.toml")))
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_sits_next_to_base_file() {
        let overlay = env_overlay(Path::new("/etc/app/config.toml"), "production");
        assert_eq!(overlay, Some(PathBuf::from("/etc/app/config.prod.toml")));
        assert_eq!(env_overlay(Path::new("config.toml"), "staging"), None);
    }

    #[test]
    fn rejects_alpha_outside_unit_interval() {
        let mut config = AppConfig::default();
        config.retrieval.alpha = 1.5;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        config.retrieval.alpha = f32::NAN;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_iterations() {
        let mut config = AppConfig::default();
        config.refinement.max_iterations = 0;
        assert!(config.validate().is_err());
    }
}
