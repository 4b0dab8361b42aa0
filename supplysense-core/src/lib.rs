//! Core types shared by every SupplySense crate.
//!
//! Holds the persisted entities, per-product aggregation, the dashboard
//! presentation model, the LLM request/response contract and the error type.

mod context;
pub mod dashboard;
mod error;
mod llm;
mod model;
mod summary;

pub use context::UserContext;
pub use dashboard::{build_dashboard, DashboardKpis, DashboardView, StockLevel, TrendPoint};
pub use error::SupplySenseError;
pub use llm::{LlmRequest, LlmResponse, Message, Role, ToolCall, ToolCallingLlm, ToolSpec};
pub use model::{
    AgentMessage, CoordinationSession, Insight, InsightStatus, NewAgentMessage, NewInsight,
    NewSalesRecord, RiskLevel, SalesRecord, SessionStatus, Upload,
};
pub use summary::{summarize_products, AnalysisSummary, InventorySnapshot, ProductSummary};

pub type Value = serde_json::Value;

/// RFC 3339 UTC timestamp with microsecond precision; sorts lexicographically.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
