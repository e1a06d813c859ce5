use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OrderRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationCategory {
    Demand,
    Revenue,
    Quality,
    Operations,
    Menu,
    Delivery,
    Customer,
    /// Catch-all for recommendations that match no known topic word.
    Strategy,
    /// Default for degenerate input the parser could not analyze at all.
    General,
}

impl RecommendationCategory {
    /// Infer a category from free-form insight text by substring match
    /// against a fixed list of topic stems. First match wins.
    pub fn infer(text: &str) -> Self {
        const TOPICS: &[(&str, RecommendationCategory)] = &[
            ("demand", RecommendationCategory::Demand),
            ("revenue", RecommendationCategory::Revenue),
            ("quality", RecommendationCategory::Quality),
            ("operation", RecommendationCategory::Operations),
            ("menu", RecommendationCategory::Menu),
            ("deliver", RecommendationCategory::Delivery),
            ("customer", RecommendationCategory::Customer),
        ];

        let lower = text.to_lowercase();
        TOPICS
            .iter()
            .find(|(stem, _)| lower.contains(stem))
            .map(|(_, category)| *category)
            .unwrap_or(RecommendationCategory::Strategy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationCategory::Demand => "Demand",
            RecommendationCategory::Revenue => "Revenue",
            RecommendationCategory::Quality => "Quality",
            RecommendationCategory::Operations => "Operations",
            RecommendationCategory::Menu => "Menu",
            RecommendationCategory::Delivery => "Delivery",
            RecommendationCategory::Customer => "Customer",
            RecommendationCategory::Strategy => "Strategy",
            RecommendationCategory::General => "General",
        }
    }
}

/// A single structured recommendation parsed out of model (or fallback
/// analyzer) text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub insight: String,
    /// At most 5 concrete follow-up steps.
    pub action_items: Vec<String>,
    /// Display-only confidence in [0, 1]; never used for ranking.
    pub confidence: f32,
}

/// The result of one analysis call, immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DssAnalysis {
    pub generated_at: DateTime<Utc>,
    pub query: String,
    /// Top retrieved orders, truncated to 3 for display.
    pub similar_orders: Vec<OrderRecord>,
    pub recommendations: Vec<Recommendation>,
    pub executive_summary: String,
    /// False when the local rule-based analyzer substituted for the model.
    pub ai_generated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseStats {
    pub ready: bool,
    pub embeddings_count: usize,
}
