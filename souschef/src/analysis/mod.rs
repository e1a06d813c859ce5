mod context;
mod engine;
mod fallback;
mod parser;

pub use context::assemble_context;
pub use engine::DecisionEngine;
pub use fallback::local_analysis;
pub use parser::parse_recommendations;
