use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chunking::{DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::error::IndexError;

/// One retrievable unit of a guideline document, persisted verbatim in the
/// metadata artifact. Whole documents carry no chunk position; split
/// documents get `{source_file}#chunk_{n}` ids with 1-based positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub text: String,
    pub source_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct IndexerOptions {
    pub chunking_enabled: bool,
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            chunking_enabled: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl IndexerOptions {
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.chunk_size == 0 {
            return Err(IndexError::InvalidChunkConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(IndexError::InvalidChunkConfig(format!(
                "overlap {} must be smaller than chunk_size {}",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Best-effort build report: the core collects, the caller decides what is
/// fatal and what gets logged.
#[derive(Debug)]
pub struct BuildSummary {
    pub discovered_files: usize,
    pub indexed_documents: usize,
    pub indexed_chunks: usize,
    pub embedding_dimensions: usize,
    pub skipped_files: Vec<SkippedFile>,
    pub artifacts_written: bool,
    pub finished_at: DateTime<Utc>,
}
