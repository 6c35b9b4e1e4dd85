//! Text embedding backends shared by the link selector.

pub mod hashed;
pub mod openai;

use clap::ValueEnum;
use std::time::Duration;

pub use hashed::HashedEmbedder;
pub use openai::OpenAiEmbedder;

/// Turns short texts into fixed-length vectors.
///
/// Implementations must be deterministic for a given input and return exactly
/// one vector per input, all of the same length.
pub trait Embedder {
    /// Embeds `texts`, preserving input order.
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Output dimensionality, when known ahead of the first call.
    fn dimensions(&self) -> Option<usize>;

    /// Short backend label for logs.
    fn name(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).encode(texts)
    }

    fn dimensions(&self) -> Option<usize> {
        (**self).dimensions()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Failures inside an embedding backend. Always fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// The backend could not be constructed.
    #[error("failed to load embedding model {model}: {reason}")]
    ModelLoad {
        /// Model identifier that was requested.
        model: String,
        /// Underlying cause.
        reason: String,
    },
    /// Transport-level failure talking to a remote backend.
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The remote backend answered with a non-success status.
    #[error("embedding backend returned {status}: {body}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// The backend returned a different number of vectors than inputs.
    #[error("backend returned {actual} embeddings for {expected} inputs")]
    CountMismatch {
        /// Number of inputs sent.
        expected: usize,
        /// Number of vectors received.
        actual: usize,
    },
    /// Vectors of differing lengths within one model.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Length of the first vector.
        expected: usize,
        /// Length of the offending vector.
        actual: usize,
    },
    /// Output that cannot be scored (empty or non-finite vectors).
    #[error("malformed embedding output: {0}")]
    Malformed(String),
}

/// Available backend families.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/embeddings` HTTP endpoint.
    #[value(name = "openai")]
    OpenAi,
    /// Offline hashed bag-of-words vectors.
    Hashed,
}

/// Everything needed to construct a backend once at startup.
#[derive(Clone, Debug)]
pub struct EmbedderConfig {
    /// Which backend to build.
    pub backend: EmbeddingBackend,
    /// API key for remote backends.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Remote model identifier.
    pub model: String,
    /// Optional dimension override for remote models that support it.
    pub dimensions: Option<usize>,
    /// Max texts per remote request.
    pub batch_size: usize,
    /// Per-request timeout for remote calls.
    pub timeout: Duration,
    /// Bucket count for the hashed backend.
    pub hashed_dimensions: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::OpenAi,
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            batch_size: 64,
            timeout: Duration::from_secs(30),
            hashed_dimensions: hashed::DEFAULT_DIMENSIONS,
        }
    }
}

/// Builds the configured backend. Called once per process.
pub fn load(config: &EmbedderConfig) -> Result<Box<dyn Embedder>, EmbeddingError> {
    match config.backend {
        EmbeddingBackend::OpenAi => {
            let api_key = config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .ok_or_else(|| EmbeddingError::ModelLoad {
                    model: config.model.clone(),
                    reason: "missing OpenAI API key (set OPENAI_API_KEY)".to_string(),
                })?;
            let embedder = OpenAiEmbedder::new(
                api_key,
                &config.base_url,
                &config.model,
                config.dimensions,
                config.timeout,
                config.batch_size,
            )?;
            Ok(Box::new(embedder))
        }
        EmbeddingBackend::Hashed => {
            let embedder = HashedEmbedder::new(config.hashed_dimensions).ok_or_else(|| {
                EmbeddingError::ModelLoad {
                    model: "hashed".to_string(),
                    reason: "dimensions must be non-zero".to_string(),
                }
            })?;
            Ok(Box::new(embedder))
        }
    }
}

/// Checks the shape invariants every backend promises.
pub fn validate_batch(vectors: &[Vec<f32>], expected: usize) -> Result<(), EmbeddingError> {
    if vectors.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            actual: vectors.len(),
        });
    }
    let Some(first) = vectors.first() else {
        return Ok(());
    };
    if first.is_empty() {
        return Err(EmbeddingError::Malformed("empty vector".to_string()));
    }
    for vector in vectors {
        if vector.len() != first.len() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: first.len(),
                actual: vector.len(),
            });
        }
        if vector.iter().any(|value| !value.is_finite()) {
            return Err(EmbeddingError::Malformed(
                "non-finite vector component".to_string(),
            ));
        }
    }
    Ok(())
}
