use chrono::Utc;

use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::error::{Result, SousChefError};
use crate::gateway::ModelGateway;
use crate::knowledge::KnowledgeBase;
use crate::models::{DssAnalysis, KnowledgeBaseStats, OrderRecord};

use super::context::assemble_context;
use super::fallback::local_analysis;
use super::parser::{is_enumerated, parse_recommendations};

const RETRIEVAL_TOP_K: usize = 5;
const DISPLAY_SIMILAR_ORDERS: usize = 3;
const SUMMARY_MAX_CHARS: usize = 600;

/// Session-scoped orchestrator owning the knowledge base and the gateway.
/// `analyze` is read-only with respect to the knowledge base; rebuilds must
/// be serialized by the caller.
pub struct DecisionEngine {
    knowledge_base: KnowledgeBase,
    gateway: ModelGateway,
}

impl DecisionEngine {
    pub fn new(config: &Config) -> Result<Self> {
        let provider = EmbeddingProvider::new(&config.embeddings);
        Ok(Self {
            knowledge_base: KnowledgeBase::new(provider),
            gateway: ModelGateway::new(&config.model)?,
        })
    }

    /// Build (or rebuild) the knowledge base from the current order snapshot.
    pub async fn build_knowledge_base(&mut self, orders: &[OrderRecord]) {
        self.knowledge_base.build(orders).await;
    }

    pub async fn retrieve_similar_orders(&self, query: &str, top_k: usize) -> Vec<OrderRecord> {
        self.knowledge_base.retrieve(query, top_k).await
    }

    pub fn stats(&self) -> KnowledgeBaseStats {
        self.knowledge_base.stats()
    }

    pub fn reset(&mut self) {
        self.knowledge_base.reset();
    }

    /// Run the full pipeline for one query: retrieve, assemble, query the
    /// model (falling back to the local analyzer if every endpoint fails),
    /// and parse the text into structured recommendations.
    ///
    /// The only surfaced failure is an empty order store; everything else is
    /// recovered internally.
    pub async fn analyze(
        &self,
        query: &str,
        orders: &[OrderRecord],
        operator: &str,
        base_url: &str,
    ) -> Result<DssAnalysis> {
        if orders.is_empty() {
            return Err(SousChefError::EmptyOrderStore);
        }

        let similar = self.knowledge_base.retrieve(query, RETRIEVAL_TOP_K).await;
        let context = assemble_context(orders, &similar, query);

        let (text, ai_generated) = match self.gateway.query(&context, operator, base_url).await {
            Ok(text) => (text, true),
            Err(SousChefError::AllEndpointsFailed { .. }) => {
                tracing::warn!(base_url, "No model endpoint reachable; using local rule-based analysis");
                (local_analysis(&similar, query, operator), false)
            }
            Err(other) => return Err(other),
        };

        let recommendations = parse_recommendations(&text);
        let executive_summary = executive_summary(&text);

        Ok(DssAnalysis {
            generated_at: Utc::now(),
            query: query.to_string(),
            similar_orders: similar.into_iter().take(DISPLAY_SIMILAR_ORDERS).collect(),
            recommendations,
            executive_summary,
            ai_generated,
        })
    }
}

/// The prose before the first enumerated recommendation, bounded for display.
fn executive_summary(text: &str) -> String {
    let mut summary = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if is_enumerated(trimmed) {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }
        if !summary.is_empty() {
            summary.push(' ');
        }
        summary.push_str(trimmed);
    }

    if summary.is_empty() {
        summary = text.trim().to_string();
    }

    if summary.chars().count() > SUMMARY_MAX_CHARS {
        summary = summary.chars().take(SUMMARY_MAX_CHARS).collect();
    }

    summary
}
