//! souschef — retrieval-augmented decision support for cloud-kitchen order
//! data.
//!
//! Orders are embedded into an in-memory knowledge base; a free-text operator
//! question retrieves the most similar historical orders, which are blended
//! with dataset-wide aggregates into a bounded prompt for a local or hosted
//! language model. When no model endpoint is reachable, a deterministic
//! rule-based analyzer answers instead, so a query always yields structured
//! recommendations.
//!
//! ```no_run
//! use souschef::{Config, DecisionEngine};
//!
//! # async fn run(orders: Vec<souschef::OrderRecord>) -> souschef::Result<()> {
//! let config = Config::from_env();
//! let mut engine = DecisionEngine::new(&config)?;
//! engine.build_knowledge_base(&orders).await;
//!
//! let analysis = engine
//!     .analyze("How can I reduce rejections?", &orders, "Asha", &config.model.base_url)
//!     .await?;
//! println!("{}", analysis.executive_summary);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod gateway;
pub mod knowledge;
pub mod models;

pub use analysis::DecisionEngine;
pub use config::Config;
pub use error::{Result, SousChefError};
pub use models::{
    DssAnalysis, KnowledgeBaseStats, OrderRecord, OrderStatus, Recommendation,
    RecommendationCategory,
};
