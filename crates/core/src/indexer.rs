use std::path::{Path, PathBuf};

use chrono::Utc;
use walkdir::WalkDir;

use crate::chunking::{chunk_text, ChunkingConfig};
use crate::embeddings::Embedder;
use crate::error::{EmbedError, IndexError};
use crate::extractor::{extract_text, SourceKind};
use crate::models::{BuildSummary, DocumentChunk, IndexerOptions, SkippedFile};
use crate::store::{save_index, EmbeddingMatrix};

/// Chunks per embedding request; a batch never splits a chunk's text.
pub const EMBED_BATCH_SIZE: usize = 32;

/// Recursively find every supported document under `source_dir`, sorted so
/// index row order is stable across runs.
pub fn discover_source_files(source_dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(source_dir)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if SourceKind::from_path(entry.path()).is_some() {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

/// Identity of a document inside the index: its path relative to the source
/// directory, with separators normalized to `/` so ids are stable across
/// operating systems.
fn relative_id(path: &Path, source_dir: &Path) -> String {
    let relative = path.strip_prefix(source_dir).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Turn a directory of guideline documents into the persisted index pair at
/// `out_base` (`<out_base>.json` + `<out_base>.vec`).
///
/// Per-file extraction failures are collected into the summary and never
/// abort the build. Finding no supported files is a non-fatal empty result;
/// producing zero chunks from files that were found is an error. Nothing is
/// partially written in either case.
pub async fn build_index(
    source_dir: &Path,
    out_base: &Path,
    options: &IndexerOptions,
    embedder: &dyn Embedder,
) -> Result<BuildSummary, IndexError> {
    if !source_dir.is_dir() {
        return Err(IndexError::MissingSourceDir(source_dir.to_path_buf()));
    }
    options.validate()?;

    let files = discover_source_files(source_dir);
    if files.is_empty() {
        return Ok(BuildSummary {
            discovered_files: 0,
            indexed_documents: 0,
            indexed_chunks: 0,
            embedding_dimensions: embedder.dimensions(),
            skipped_files: Vec::new(),
            artifacts_written: false,
            finished_at: Utc::now(),
        });
    }

    let config = ChunkingConfig {
        chunk_size: options.chunk_size,
        overlap: options.overlap,
    };

    let mut chunks = Vec::new();
    let mut skipped_files = Vec::new();
    let mut indexed_documents = 0usize;

    for path in &files {
        let kind = match SourceKind::from_path(path) {
            Some(kind) => kind,
            None => continue,
        };

        let text = match extract_text(path, kind) {
            Ok(text) => text,
            Err(error) => {
                skipped_files.push(SkippedFile {
                    path: path.clone(),
                    reason: error.to_string(),
                });
                continue;
            }
        };

        if text.is_empty() {
            continue;
        }

        let file_id = relative_id(path, source_dir);

        if options.chunking_enabled && text.chars().count() > options.chunk_size {
            let pieces = chunk_text(&text, config);
            let total = pieces.len();
            for (position, piece) in pieces.into_iter().enumerate() {
                chunks.push(DocumentChunk {
                    id: format!("{file_id}#chunk_{}", position + 1),
                    text: piece,
                    source_file: file_id.clone(),
                    chunk_index: Some(position + 1),
                    total_chunks: Some(total),
                });
            }
        } else {
            chunks.push(DocumentChunk {
                id: file_id.clone(),
                text,
                source_file: file_id,
                chunk_index: None,
                total_chunks: None,
            });
        }

        indexed_documents += 1;
    }

    if chunks.is_empty() {
        return Err(IndexError::NoValidDocuments);
    }

    let mut matrix = EmbeddingMatrix::with_dimensions(embedder.dimensions());
    for batch in chunks.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = embedder.encode(&texts).await?;

        if vectors.len() != texts.len() {
            return Err(IndexError::Embed(EmbedError::CountMismatch {
                sent: texts.len(),
                received: vectors.len(),
            }));
        }
        for vector in &vectors {
            matrix.push_row(vector)?;
        }
    }

    save_index(out_base, &chunks, &matrix)?;

    Ok(BuildSummary {
        discovered_files: files.len(),
        indexed_documents,
        indexed_chunks: chunks.len(),
        embedding_dimensions: matrix.dims(),
        skipped_files,
        artifacts_written: true,
        finished_at: Utc::now(),
    })
}
