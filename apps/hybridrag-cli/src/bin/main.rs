//! hybridrag: ingest text into LanceDB and answer questions over it.
//!
//! ```bash
//! hybridrag ingest ./data/txt
//! hybridrag ingest ./notes --topic billing
//! hybridrag retrieve "refund window" --retriever hybrid --detect-topic
//! hybridrag ask "why was I charged twice" --mode iterative
//! hybridrag chat --mode hybrid
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use hybridrag_core::config::AppConfig;
use hybridrag_core::data_processor::DataProcessor;
use hybridrag_core::traits::{DenseIndex, Embedder, VectorIndexer};
use hybridrag_core::types::EmbedRole;
use hybridrag_embed::{get_default_embedder, EmbeddingTopicResolver};
use hybridrag_llm::ChatClient;
use hybridrag_refine::{ConversationMemory, QueryOutcome, QueryPipeline, RetrieverKind};
use hybridrag_vector::LanceStore;

#[derive(Parser)]
#[command(name = "hybridrag", version, about = "Hybrid dense + BM25 retrieval with iterative answer refinement")]
struct Cli {
    /// Base configuration file; `config.<env>.toml` next to it is layered on top
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk, embed and store every .txt file under a directory
    Ingest {
        dir: PathBuf,
        /// Topic for every passage; defaults to each file's parent directory
        #[arg(long)]
        topic: Option<String>,
        /// Only process the first N files
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 32)]
        batch_size: usize,
    },
    /// Print ranked documents without generating an answer
    Retrieve {
        question: String,
        /// standard | hybrid
        #[arg(long, default_value = "hybrid")]
        retriever: String,
        #[arg(long)]
        detect_topic: bool,
        #[arg(long)]
        json: bool,
    },
    /// Answer one question
    Ask {
        question: String,
        /// standard | hybrid | iterative | iterative:standard | iterative:hybrid
        #[arg(long, default_value = "hybrid")]
        mode: String,
        #[arg(long)]
        detect_topic: bool,
    },
    /// Interactive session with conversation memory
    Chat {
        #[arg(long, default_value = "hybrid")]
        mode: String,
        #[arg(long)]
        detect_topic: bool,
    },
    /// List the topic labels present in the collection
    Topics,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let config = AppConfig::load_from(&cli.config).with_context(|| format!("loading {}", cli.config.display()))?;
    match cli.command {
        Command::Ingest { dir, topic, limit, batch_size } => ingest(&config, &dir, topic.as_deref(), limit, batch_size),
        Command::Retrieve { question, retriever, detect_topic, json } => {
            let kind: RetrieverKind = retriever.parse()?;
            let docs = build_pipeline(&config)?.retrieve_only(&question, kind, detect_topic)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&docs)?);
            } else if docs.is_empty() {
                println!("No documents found.");
            } else {
                for (i, doc) in docs.iter().enumerate() {
                    let topic = doc.topic.as_deref().unwrap_or("-");
                    println!("{}. [{:.4}] {} ({topic})\n   {}", i + 1, doc.score, doc.id, preview(&doc.text, 160));
                }
            }
            Ok(())
        }
        Command::Ask { question, mode, detect_topic } => {
            let outcome = build_pipeline(&config)?.ask_tagged(&question, &mode, detect_topic, None)?;
            print_outcome(&outcome);
            Ok(())
        }
        Command::Chat { mode, detect_topic } => chat(&config, &mode, detect_topic),
        Command::Topics => {
            let store = open_store(&config)?;
            for topic in store.topics()? {
                println!("{topic}");
            }
            Ok(())
        }
    }
}

fn open_store(config: &AppConfig) -> Result<LanceStore> {
    let path = config.store.path();
    Ok(LanceStore::open(&path, &config.store.table, config.embedding.dimension)?)
}

fn build_pipeline(config: &AppConfig) -> Result<QueryPipeline> {
    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder(&config.embedding)?);
    let store = Arc::new(open_store(config)?);
    let llm = Arc::new(ChatClient::new(&config.llm)?);
    let resolver = Arc::new(EmbeddingTopicResolver::new(embedder.clone()));
    Ok(QueryPipeline::new(embedder, store, resolver, llm.clone(), llm, config)?)
}

fn ingest(config: &AppConfig, dir: &std::path::Path, topic: Option<&str>, limit: Option<usize>, batch_size: usize) -> Result<()> {
    tracing::info!(dir = %dir.display(), ?topic, "ingesting");
    let passages = DataProcessor::new().process_directory(dir, topic, limit)?;
    if passages.is_empty() {
        tracing::warn!(dir = %dir.display(), "no passages to index");
        return Ok(());
    }
    let embedder = get_default_embedder(&config.embedding)?;
    let store = open_store(config)?;
    store.ensure_collection()?;

    let pb = ProgressBar::new(passages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} passages ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );
    for batch in passages.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|p| p.text.clone()).collect();
        let embeddings = embedder.embed_as(EmbedRole::Passage, &texts)?;
        store.index(batch, &embeddings)?;
        tracing::debug!(rows = batch.len(), "embedded and stored batch");
        pb.inc(batch.len() as u64);
    }
    pb.finish_with_message("done");
    tracing::info!(passages = passages.len(), table = %store.table_name(), total_rows = store.count()?, "ingest complete");
    Ok(())
}

fn chat(config: &AppConfig, mode: &str, detect_topic: bool) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let mut memory = ConversationMemory::new(config.memory.capacity);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else { break };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        match pipeline.ask_tagged(question, mode, detect_topic, Some(&mut memory)) {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => tracing::error!(error = %e, "question failed"),
        }
    }
    Ok(())
}

fn print_outcome(outcome: &QueryOutcome) {
    println!("{}", outcome.answer);
    println!(
        "\n[{}] topic: {} | rounds: {} | {:.3}s",
        outcome.strategy,
        outcome.topic.as_deref().unwrap_or("-"),
        outcome.rounds,
        outcome.elapsed.as_secs_f64()
    );
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{cut}…")
}
