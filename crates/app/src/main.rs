use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use guideline_search_core::{
    build_index, BuildSummary, Embedder, GuidelineRetriever, HashEmbedder, IndexerOptions,
    RemoteEmbedder, RemoteEmbedderConfig, DEFAULT_CHUNK_SIZE, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_INDEX_BASE, DEFAULT_OVERLAP, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TOP_K,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "guideline-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Index base path; artifacts live at <base>.json and <base>.vec
    #[arg(long, env = "GUIDELINE_INDEX_BASE", default_value = DEFAULT_INDEX_BASE)]
    index_base: PathBuf,

    /// Remote embedding service endpoint; the local hashing model is used
    /// when unset
    #[arg(long, env = "EMBEDDING_ENDPOINT")]
    embedding_endpoint: Option<String>,

    /// Bearer token for the embedding service
    #[arg(long, env = "EMBEDDING_API_KEY")]
    embedding_api_key: Option<String>,

    /// Embedding vector width
    #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    embedding_dimensions: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Build the guideline index from a folder of documents.
    Index {
        /// Folder scanned recursively for markdown, text, and PDF files.
        #[arg(long)]
        source: PathBuf,
        /// Maximum characters per chunk.
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Characters of overlap between consecutive chunks.
        #[arg(long, default_value_t = DEFAULT_OVERLAP)]
        overlap: usize,
        /// Store each document whole instead of splitting it.
        #[arg(long, default_value_t = false)]
        no_chunk: bool,
    },
    /// Query the index and print the best-matching passages.
    Search {
        /// Natural-language query.
        #[arg(long)]
        query: String,
        /// Number of passages to return.
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
}

fn build_embedder(cli: &Cli) -> anyhow::Result<Box<dyn Embedder>> {
    match &cli.embedding_endpoint {
        Some(endpoint) => {
            let embedder = RemoteEmbedder::new(RemoteEmbedderConfig {
                endpoint: endpoint.clone(),
                api_key: cli.embedding_api_key.clone(),
                dimensions: cli.embedding_dimensions,
                timeout: DEFAULT_REQUEST_TIMEOUT,
            })?;
            Ok(Box::new(embedder))
        }
        None => Ok(Box::new(HashEmbedder {
            dimensions: cli.embedding_dimensions,
        })),
    }
}

fn report_build(summary: &BuildSummary, index_base: &Path) {
    for skipped in &summary.skipped_files {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped file");
    }

    info!(
        files = summary.discovered_files,
        documents = summary.indexed_documents,
        chunks = summary.indexed_chunks,
        dimensions = summary.embedding_dimensions,
        "index built"
    );
    println!(
        "{} chunks from {} documents indexed at {} ({}.json / {}.vec)",
        summary.indexed_chunks,
        summary.indexed_documents,
        summary.finished_at.to_rfc3339(),
        index_base.display(),
        index_base.display(),
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let embedder = build_embedder(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "guideline-search boot"
    );

    match cli.command {
        Command::Index {
            ref source,
            chunk_size,
            overlap,
            no_chunk,
        } => {
            let options = IndexerOptions {
                chunking_enabled: !no_chunk,
                chunk_size,
                overlap,
            };

            let summary =
                build_index(source, &cli.index_base, &options, embedder.as_ref()).await?;

            if !summary.artifacts_written {
                warn!(
                    source = %source.display(),
                    "no supported documents found, nothing written"
                );
                println!("0 documents found under {}", source.display());
                return Ok(());
            }

            report_build(&summary, &cli.index_base);
        }
        Command::Search { query, top_k } => {
            let retriever =
                GuidelineRetriever::with_index_base(embedder, cli.index_base.clone());
            let hits = retriever.hybrid_search(&query, top_k).await?;

            if hits.is_empty() {
                println!("no relevant guideline passages found");
                return Ok(());
            }

            for (rank, hit) in hits.iter().enumerate() {
                println!("{}. [{}] score={:.4}", rank + 1, hit.id, hit.score);
                println!("{}", hit.text);
            }
        }
    }

    Ok(())
}
