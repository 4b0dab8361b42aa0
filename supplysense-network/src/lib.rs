//! Simulated multi-agent supply chain coordination.
//!
//! A [`Coordinator`] describes the [`AgentRoster`] and the user's inventory to
//! a tool-calling model, which returns the whole message exchange and a final
//! report in one reply. Both are stored and can be replayed later.

mod coordinator;
pub mod error;
pub mod prompt;
pub mod render;
pub mod report;
pub mod roster;
pub mod scenario;
pub mod timeline;

pub use coordinator::{
    CoordinationOutcome, CoordinationRequest, Coordinator, SessionDetail, DEFAULT_MODEL,
};
pub use error::NetworkError;
pub use render::{graph_layout, render_text, report_view, GraphLayout, ReportView};
pub use report::{CoordinationMessage, CoordinationReport};
pub use roster::{AgentProfile, AgentRoster};
pub use scenario::{find_scenario, scenario_catalogue, Disruption, Scenario, DISRUPTION_TRIGGER};
pub use timeline::{paced, reveal_schedule, REVEAL_INTERVAL};
