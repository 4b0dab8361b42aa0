//! Per-product inventory insights produced by a tool-calling LLM.

mod analyzer;
pub mod error;
pub mod prompt;

pub use analyzer::{AnalysisOutcome, InsightAnalyzer, DEFAULT_MODEL};
pub use error::InsightError;
