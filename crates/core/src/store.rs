use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EmbedError, IndexError, SearchError};
use crate::models::DocumentChunk;

/// Vector artifact layout: `rows: u32 LE`, `dims: u32 LE`, then
/// `rows * dims` f32 LE values in row-major order.
const VECTOR_HEADER_SIZE: usize = 8;

pub const METADATA_EXTENSION: &str = "json";
pub const VECTORS_EXTENSION: &str = "vec";

/// Row-major embedding matrix; every row is expected to be unit-normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    rows: usize,
    dims: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    pub fn with_dimensions(dims: usize) -> Self {
        Self {
            rows: 0,
            dims,
            data: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: &[f32]) -> Result<(), EmbedError> {
        if row.len() != self.dims {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dims,
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, index: usize) -> &[f32] {
        let offset = index * self.dims;
        &self.data[offset..offset + self.dims]
    }
}

/// The read-only pair a searcher operates on. Row `i` of the matrix embeds
/// `chunks[i]`; the two must never be reordered independently.
#[derive(Debug)]
pub struct LoadedIndex {
    pub chunks: Vec<DocumentChunk>,
    pub matrix: EmbeddingMatrix,
}

pub fn metadata_path(base: &Path) -> PathBuf {
    sibling_path(base, METADATA_EXTENSION)
}

pub fn vectors_path(base: &Path) -> PathBuf {
    sibling_path(base, VECTORS_EXTENSION)
}

fn sibling_path(base: &Path, extension: &str) -> PathBuf {
    let mut raw = base.as_os_str().to_os_string();
    raw.push(format!(".{extension}"));
    PathBuf::from(raw)
}

fn staging_path(target: &Path) -> PathBuf {
    let mut raw = target.as_os_str().to_os_string();
    raw.push(".tmp");
    PathBuf::from(raw)
}

/// Write both artifacts, staging to temp files and renaming into place so a
/// concurrent reader never sees a metadata file beside a stale vector file.
pub fn save_index(
    base: &Path,
    chunks: &[DocumentChunk],
    matrix: &EmbeddingMatrix,
) -> Result<(), IndexError> {
    if let Some(parent) = base.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let vectors_target = vectors_path(base);
    let metadata_target = metadata_path(base);

    let mut payload = Vec::with_capacity(VECTOR_HEADER_SIZE + matrix.data.len() * 4);
    payload.extend_from_slice(&(matrix.rows as u32).to_le_bytes());
    payload.extend_from_slice(&(matrix.dims as u32).to_le_bytes());
    payload.extend_from_slice(bytemuck::cast_slice(&matrix.data));

    let staged_vectors = staging_path(&vectors_target);
    fs::write(&staged_vectors, &payload)?;

    let staged_metadata = staging_path(&metadata_target);
    fs::write(&staged_metadata, serde_json::to_vec_pretty(chunks)?)?;

    // Vectors land first; metadata is the last artifact to appear.
    fs::rename(&staged_vectors, &vectors_target)?;
    fs::rename(&staged_metadata, &metadata_target)?;

    Ok(())
}

pub fn load_index(base: &Path) -> Result<LoadedIndex, SearchError> {
    let metadata_target = metadata_path(base);
    let vectors_target = vectors_path(base);

    if !metadata_target.is_file() {
        return Err(SearchError::IndexNotFound(metadata_target));
    }
    if !vectors_target.is_file() {
        return Err(SearchError::IndexNotFound(vectors_target));
    }

    let chunks: Vec<DocumentChunk> = serde_json::from_slice(&fs::read(&metadata_target)?)?;

    let bytes = fs::read(&vectors_target)?;
    if bytes.len() < VECTOR_HEADER_SIZE {
        return Err(SearchError::IndexCorrupt(format!(
            "vector file is {} bytes, shorter than its header",
            bytes.len()
        )));
    }

    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[0..4]);
    let rows = u32::from_le_bytes(word) as usize;
    word.copy_from_slice(&bytes[4..8]);
    let dims = u32::from_le_bytes(word) as usize;

    if rows > 0 && dims == 0 {
        return Err(SearchError::IndexCorrupt(format!(
            "vector header claims {rows} rows of width zero"
        )));
    }

    let payload = &bytes[VECTOR_HEADER_SIZE..];
    let expected = rows * dims * std::mem::size_of::<f32>();
    if payload.len() != expected {
        return Err(SearchError::IndexCorrupt(format!(
            "vector payload is {} bytes, header claims {rows} x {dims}",
            payload.len()
        )));
    }

    if rows != chunks.len() {
        return Err(SearchError::IndexCorrupt(format!(
            "{} metadata records but {rows} vector rows",
            chunks.len()
        )));
    }

    let data: Vec<f32> = bytemuck::cast_slice(payload).to_vec();

    Ok(LoadedIndex {
        chunks,
        matrix: EmbeddingMatrix { rows, dims, data },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_chunks() -> Vec<DocumentChunk> {
        vec![
            DocumentChunk {
                id: "headache.md".to_string(),
                text: "Take ibuprofen for headache.".to_string(),
                source_file: "headache.md".to_string(),
                chunk_index: None,
                total_chunks: None,
            },
            DocumentChunk {
                id: "hydration.md".to_string(),
                text: "Drink water for dehydration.".to_string(),
                source_file: "hydration.md".to_string(),
                chunk_index: None,
                total_chunks: None,
            },
        ]
    }

    fn sample_matrix() -> EmbeddingMatrix {
        let mut matrix = EmbeddingMatrix::with_dimensions(3);
        matrix.push_row(&[1.0, 0.0, 0.0]).expect("row");
        matrix.push_row(&[0.0, 1.0, 0.0]).expect("row");
        matrix
    }

    #[test]
    fn save_then_load_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path().join("guidelines_index");

        save_index(&base, &sample_chunks(), &sample_matrix())?;
        let loaded = load_index(&base)?;

        assert_eq!(loaded.chunks, sample_chunks());
        assert_eq!(loaded.matrix, sample_matrix());
        assert_eq!(loaded.matrix.row(1), &[0.0, 1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn save_creates_missing_parent_directories() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path().join("nested/deeper/guidelines_index");

        save_index(&base, &sample_chunks(), &sample_matrix())?;
        assert!(metadata_path(&base).is_file());
        assert!(vectors_path(&base).is_file());
        Ok(())
    }

    #[test]
    fn missing_metadata_artifact_is_index_not_found() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path().join("guidelines_index");

        let result = load_index(&base);
        assert!(matches!(result, Err(SearchError::IndexNotFound(_))));
        Ok(())
    }

    #[test]
    fn missing_vector_artifact_is_index_not_found() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path().join("guidelines_index");

        save_index(&base, &sample_chunks(), &sample_matrix())?;
        fs::remove_file(vectors_path(&base))?;

        let result = load_index(&base);
        assert!(matches!(result, Err(SearchError::IndexNotFound(_))));
        Ok(())
    }

    #[test]
    fn row_count_mismatch_is_index_corrupt() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path().join("guidelines_index");

        save_index(&base, &sample_chunks(), &sample_matrix())?;

        // Drop one metadata record while leaving the vectors untouched.
        let mut chunks = sample_chunks();
        chunks.pop();
        fs::write(metadata_path(&base), serde_json::to_vec_pretty(&chunks)?)?;

        let result = load_index(&base);
        assert!(matches!(result, Err(SearchError::IndexCorrupt(_))));
        Ok(())
    }

    #[test]
    fn truncated_vector_file_is_index_corrupt() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path().join("guidelines_index");

        save_index(&base, &sample_chunks(), &sample_matrix())?;

        let bytes = fs::read(vectors_path(&base))?;
        fs::write(vectors_path(&base), &bytes[..bytes.len() - 4])?;

        let result = load_index(&base);
        assert!(matches!(result, Err(SearchError::IndexCorrupt(_))));
        Ok(())
    }

    #[test]
    fn empty_index_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path().join("guidelines_index");

        save_index(&base, &[], &EmbeddingMatrix::with_dimensions(3))?;
        let loaded = load_index(&base)?;

        assert!(loaded.chunks.is_empty());
        assert!(loaded.matrix.is_empty());
        Ok(())
    }

    #[test]
    fn dimension_mismatch_row_is_rejected() {
        let mut matrix = EmbeddingMatrix::with_dimensions(3);
        let result = matrix.push_row(&[1.0, 0.0]);
        assert!(matches!(
            result,
            Err(EmbedError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }
}
