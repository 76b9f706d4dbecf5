pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod indexer;
pub mod models;
pub mod retriever;
pub mod store;

pub use chunking::{chunk_text, ChunkingConfig, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
pub use embeddings::{
    l2_normalize, Embedder, HashEmbedder, RemoteEmbedder, RemoteEmbedderConfig,
    DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_REQUEST_TIMEOUT,
};
pub use error::{EmbedError, IndexError, SearchError};
pub use extractor::{extract_text, SourceKind};
pub use indexer::{build_index, discover_source_files, EMBED_BATCH_SIZE};
pub use models::{BuildSummary, DocumentChunk, IndexerOptions, SearchHit, SkippedFile};
pub use retriever::{GuidelineRetriever, DEFAULT_INDEX_BASE, DEFAULT_TOP_K};
pub use store::{
    load_index, metadata_path, save_index, vectors_path, EmbeddingMatrix, LoadedIndex,
};
