use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::EmbedError;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 128;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Contract: one L2-normalized vector of `dimensions()` length per input, in
/// input order. The same model must serve index build and query time.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

#[async_trait]
impl Embedder for Box<dyn Embedder> {
    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        (**self).encode(texts).await
    }
}

pub fn l2_normalize(vector: &mut [f32]) {
    let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

/// Deterministic local model: FNV-hashed character trigrams of the lowercased
/// text, bucketed into a fixed-width vector and L2-normalized.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    pub dimensions: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl HashEmbedder {
    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

#[derive(Debug, Clone)]
pub struct RemoteEmbedderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub dimensions: usize,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    normalize: bool,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Client for an external embedding service.
pub struct RemoteEmbedder {
    endpoint: Url,
    api_key: Option<String>,
    dimensions: usize,
    client: reqwest::Client,
}

impl RemoteEmbedder {
    pub fn new(config: RemoteEmbedderConfig) -> Result<Self, EmbedError> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            endpoint,
            api_key: config.api_key,
            dimensions: config.dimensions,
            client,
        })
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&EmbedRequest {
                texts,
                normalize: true,
            });

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EmbedError::BackendResponse {
                status: response.status().as_u16(),
                details: response.status().to_string(),
            });
        }

        let payload: EmbedResponse = response.json().await?;
        if payload.embeddings.len() != texts.len() {
            return Err(EmbedError::CountMismatch {
                sent: texts.len(),
                received: payload.embeddings.len(),
            });
        }

        let mut vectors = payload.embeddings;
        for vector in &mut vectors {
            if vector.len() != self.dimensions {
                return Err(EmbedError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: vector.len(),
                });
            }
            // Normalized on the service side by request; re-normalizing here
            // keeps the stored-vector invariant independent of the backend.
            l2_normalize(vector);
        }

        Ok(vectors)
    }
}
