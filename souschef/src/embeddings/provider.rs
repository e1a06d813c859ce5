#[cfg(feature = "semantic")]
use std::sync::{Arc, Mutex, OnceLock};

#[cfg(feature = "semantic")]
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::config::EmbeddingsConfig;

pub const DEFAULT_DIMENSIONS: usize = 384;

#[derive(Clone)]
enum EmbeddingBackend {
    /// Lazily-initialized shared sentence-embedding model. Initialization
    /// failure is recorded once and degrades the session to hash embeddings.
    #[cfg(feature = "semantic")]
    Semantic {
        model: Arc<OnceLock<Option<Arc<Mutex<TextEmbedding>>>>>,
    },
    /// Deterministic hash embeddings; always available.
    Hash,
}

/// Converts text into fixed-length vectors. `embed` is infallible by
/// contract: any semantic-model failure falls back to the hash strategy, so
/// the knowledge base can always be built.
#[derive(Clone)]
pub struct EmbeddingProvider {
    backend: EmbeddingBackend,
    dimensions: usize,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Self {
        let dimensions = if config.dimensions == 0 {
            DEFAULT_DIMENSIONS
        } else {
            config.dimensions
        };

        let backend = match config.strategy.to_lowercase().as_str() {
            #[cfg(feature = "semantic")]
            "semantic" => EmbeddingBackend::Semantic {
                model: Arc::new(OnceLock::new()),
            },
            #[cfg(not(feature = "semantic"))]
            "semantic" => {
                tracing::warn!(
                    "Semantic embeddings requested but the `semantic` feature is disabled; using hash embeddings"
                );
                EmbeddingBackend::Hash
            }
            "hash" => EmbeddingBackend::Hash,
            other => {
                tracing::warn!(strategy = other, "Unknown embedding strategy; using hash embeddings");
                EmbeddingBackend::Hash
            }
        };

        Self {
            backend,
            dimensions,
        }
    }

    /// A provider that only ever uses the hash strategy.
    pub fn hash_only(dimensions: usize) -> Self {
        Self {
            backend: EmbeddingBackend::Hash,
            dimensions,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed a text into a vector of `dimensions()` floats. Never fails.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        match &self.backend {
            #[cfg(feature = "semantic")]
            EmbeddingBackend::Semantic { model } => {
                match embed_semantic(Arc::clone(model), text.to_string()).await {
                    Some(vector) => vector,
                    None => hash_embedding(text, self.dimensions),
                }
            }
            EmbeddingBackend::Hash => hash_embedding(text, self.dimensions),
        }
    }
}

#[cfg(feature = "semantic")]
async fn embed_semantic(
    cell: Arc<OnceLock<Option<Arc<Mutex<TextEmbedding>>>>>,
    text: String,
) -> Option<Vec<f32>> {
    let result = tokio::task::spawn_blocking(move || {
        let model = cell
            .get_or_init(|| build_model().map(|model| Arc::new(Mutex::new(model))))
            .clone()?;

        let mut model = match model.lock() {
            Ok(model) => model,
            Err(error) => {
                tracing::warn!(%error, "Embedding model lock poisoned");
                return None;
            }
        };

        match model.embed(vec![text], None) {
            Ok(mut embedded) if !embedded.is_empty() => Some(embedded.remove(0)),
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(%error, "Semantic embedding failed; using hash embedding for this text");
                None
            }
        }
    })
    .await;

    match result {
        Ok(vector) => vector,
        Err(error) => {
            tracing::warn!(%error, "Embedding worker failed");
            None
        }
    }
}

#[cfg(feature = "semantic")]
fn build_model() -> Option<TextEmbedding> {
    // BGE-small produces 384-dimensional vectors, matching the default
    // configured dimensionality.
    match TextEmbedding::try_new(
        InitOptions::new(EmbeddingModel::BGESmallENV15).with_show_download_progress(false),
    ) {
        Ok(model) => Some(model),
        Err(error) => {
            tracing::warn!(
                %error,
                "Semantic embedding model failed to initialize; using hash embeddings for the rest of this session"
            );
            None
        }
    }
}

/// Deterministic fallback embedding: a rolling byte hash seeded per output
/// dimension. Identical input always yields an identical vector, and
/// non-empty input yields non-zero magnitude.
pub(crate) fn hash_embedding(text: &str, dimensions: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimensions];
    if text.is_empty() {
        return vector;
    }

    for (dim, slot) in vector.iter_mut().enumerate() {
        let mut acc: u32 = (dim as u32).wrapping_mul(2_654_435_761).wrapping_add(1);
        for byte in text.bytes() {
            acc = acc.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        *slot = (acc % 2_001) as f32 / 1_000.0 - 1.0;
    }

    if vector.iter().all(|v| *v == 0.0) {
        vector[0] = 1.0;
    }

    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hash_config(dimensions: usize) -> EmbeddingsConfig {
        EmbeddingsConfig {
            strategy: "hash".to_string(),
            dimensions,
        }
    }

    #[test]
    fn test_hash_embedding_is_deterministic() {
        let a = hash_embedding("Order ORD-1 from Tandoori Nights", 64);
        let b = hash_embedding("Order ORD-1 from Tandoori Nights", 64);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_embedding_differs_across_inputs() {
        let a = hash_embedding("chicken biryani", 64);
        let b = hash_embedding("paneer tikka", 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_embedding_non_empty_has_magnitude() {
        let vector = hash_embedding("x", 64);
        let magnitude: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!(magnitude > 0.0);
    }

    #[test]
    fn test_hash_embedding_empty_input_is_zero() {
        let vector = hash_embedding("", 64);
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_provider_respects_configured_dimensions() {
        let provider = EmbeddingProvider::new(&hash_config(128));
        let vector = provider.embed("test").await;
        assert_eq!(vector.len(), 128);
        assert_eq!(provider.dimensions(), 128);
    }

    #[tokio::test]
    async fn test_unknown_strategy_falls_back_to_hash() {
        let provider = EmbeddingProvider::new(&EmbeddingsConfig {
            strategy: "quantum".to_string(),
            dimensions: 32,
        });
        let vector = provider.embed("test").await;
        assert_eq!(vector, hash_embedding("test", 32));
    }

    #[test]
    fn test_zero_dimensions_uses_default() {
        let provider = EmbeddingProvider::new(&hash_config(0));
        assert_eq!(provider.dimensions(), DEFAULT_DIMENSIONS);
    }
}
