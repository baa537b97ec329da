use hybridrag_core::config::AppConfig;
use hybridrag_core::traits::Embedder;
use hybridrag_core::types::EmbedRole;
use hybridrag_embed::get_default_embedder;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let embedder = get_default_embedder(&config.embedding)?;
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    let embs = embedder.embed_as(EmbedRole::Passage, &texts)?;
    println!("B={} dim={}", embs.len(), embedder.dim());
    Ok(())
}
