mod analysis;
mod order;

pub use analysis::{DssAnalysis, KnowledgeBaseStats, Recommendation, RecommendationCategory};
pub use order::{OrderRecord, OrderStatus};
