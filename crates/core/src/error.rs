use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("embedding service returned {status}: {details}")]
    BackendResponse { status: u16, details: String },

    #[error("embedding count mismatch: sent {sent} texts, received {received} vectors")]
    CountMismatch { sent: usize, received: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source directory not found: {0}")]
    MissingSourceDir(PathBuf),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("no document produced any indexable chunk")]
    NoValidDocuments,

    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("index artifact not found: {0}")]
    IndexNotFound(PathBuf),

    #[error("index corrupt: {0}")]
    IndexCorrupt(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("deserialize error: {0}")]
    Serialization(#[from] serde_json::Error),
}
