use std::path::PathBuf;

use tokio::sync::OnceCell;

use crate::embeddings::Embedder;
use crate::error::{EmbedError, SearchError};
use crate::models::SearchHit;
use crate::store::{load_index, LoadedIndex};

pub const DEFAULT_INDEX_BASE: &str = "data/guidelines_index";
pub const DEFAULT_TOP_K: usize = 3;

/// Query-side service: one embedder plus a lazily loaded index, constructed
/// once and shared by reference across request handlers.
///
/// The index cell is the single-initialization barrier: concurrent first
/// queries race to one `load_index` execution, the losers await it and reuse
/// the result. After the load everything is a read, so searches need no
/// locking and run fully in parallel.
pub struct GuidelineRetriever<E: Embedder> {
    embedder: E,
    index_base: PathBuf,
    index: OnceCell<LoadedIndex>,
}

impl<E: Embedder> GuidelineRetriever<E> {
    pub fn new(embedder: E) -> Self {
        Self::with_index_base(embedder, PathBuf::from(DEFAULT_INDEX_BASE))
    }

    pub fn with_index_base(embedder: E, index_base: impl Into<PathBuf>) -> Self {
        Self {
            embedder,
            index_base: index_base.into(),
            index: OnceCell::new(),
        }
    }

    pub async fn load(&self) -> Result<&LoadedIndex, SearchError> {
        self.index
            .get_or_try_init(|| async { load_index(&self.index_base) })
            .await
    }

    /// Return the `k` chunks most similar to `query`, best first.
    ///
    /// Zero hits is a valid outcome ("no relevant information"), not an
    /// error. Embedding failures propagate; the abstain policy belongs to
    /// the caller.
    pub async fn hybrid_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery("query is empty".to_string()));
        }
        if k == 0 {
            return Err(SearchError::InvalidQuery(
                "k must be at least 1".to_string(),
            ));
        }

        let index = self.load().await?;
        if index.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let query_texts = [query.to_string()];
        let query_vector = self
            .embedder
            .encode(&query_texts)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                SearchError::Embed(EmbedError::CountMismatch {
                    sent: 1,
                    received: 0,
                })
            })?;

        if query_vector.len() != index.matrix.dims() {
            return Err(SearchError::Embed(EmbedError::DimensionMismatch {
                expected: index.matrix.dims(),
                actual: query_vector.len(),
            }));
        }

        // Dot product is exact cosine similarity here: both sides are
        // unit-normalized.
        let mut scored: Vec<(usize, f32)> = (0..index.matrix.rows())
            .map(|row| (row, dot(index.matrix.row(row), &query_vector)))
            .collect();

        scored.sort_by(|left, right| right.1.total_cmp(&left.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(row, score)| {
                let chunk = &index.chunks[row];
                SearchHit {
                    id: chunk.id.clone(),
                    text: chunk.text.clone(),
                    score,
                }
            })
            .collect())
    }
}

fn dot(row: &[f32], query: &[f32]) -> f32 {
    row.iter().zip(query).map(|(a, b)| a * b).sum()
}
