mod base;
mod summary;

pub use base::{EmbeddedOrder, KnowledgeBase};
pub use summary::{cosine_similarity, order_summary};
