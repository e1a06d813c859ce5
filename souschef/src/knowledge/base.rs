use crate::embeddings::EmbeddingProvider;
use crate::models::{KnowledgeBaseStats, OrderRecord};

use super::summary::{cosine_similarity, order_summary};

/// One indexed order: its vector, the summary the vector was derived from,
/// and a by-value copy of the source record.
#[derive(Debug, Clone)]
pub struct EmbeddedOrder {
    pub order_id: String,
    pub vector: Vec<f32>,
    pub summary: String,
    pub order: OrderRecord,
}

/// In-memory index of embedded order summaries. Either fully built or empty;
/// rebuilding replaces the entire index. One instance per session, owned by
/// the engine.
pub struct KnowledgeBase {
    provider: EmbeddingProvider,
    entries: Vec<EmbeddedOrder>,
    ready: bool,
}

impl KnowledgeBase {
    pub fn new(provider: EmbeddingProvider) -> Self {
        Self {
            provider,
            entries: Vec::new(),
            ready: false,
        }
    }

    /// Build (or rebuild) the index from an order snapshot. Orders are
    /// embedded sequentially so insertion order is preserved for
    /// deterministic retrieval tie-breaking.
    pub async fn build(&mut self, orders: &[OrderRecord]) {
        self.entries.clear();
        self.ready = false;

        let dimensions = self.provider.dimensions();
        for order in orders {
            let summary = order_summary(order);
            let vector = self.provider.embed(&summary).await;

            if vector.len() != dimensions {
                tracing::warn!(
                    order_id = %order.id,
                    expected = dimensions,
                    got = vector.len(),
                    "Skipping order with mismatched embedding dimensionality"
                );
                continue;
            }

            self.entries.push(EmbeddedOrder {
                order_id: order.id.clone(),
                vector,
                summary,
                order: order.clone(),
            });
        }

        self.ready = true;
        tracing::info!(count = self.entries.len(), "Knowledge base built");
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.ready = false;
    }

    pub fn stats(&self) -> KnowledgeBaseStats {
        KnowledgeBaseStats {
            ready: self.ready,
            embeddings_count: self.entries.len(),
        }
    }

    /// The `top_k` most similar orders for a free-text query, most similar
    /// first. Returns an empty vec when the base is unready or empty.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Vec<OrderRecord> {
        if !self.ready || self.entries.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let query_vector = self.provider.embed(query).await;

        let mut scored: Vec<(f32, &EmbeddedOrder)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&query_vector, &entry.vector), entry))
            .collect();

        // Stable sort: equal similarities keep insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_k)
            .map(|(_, entry)| entry.order.clone())
            .collect()
    }
}
