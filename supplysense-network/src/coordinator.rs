use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use supplysense_core::{
    summarize_products, AgentMessage, CoordinationSession, LlmRequest, Message, NewAgentMessage,
    ToolCallingLlm, UserContext,
};
use supplysense_store::SqliteStore;
use tracing::Instrument;

use crate::error::NetworkError;
use crate::prompt::{system_prompt, tool_spec, TOOL_NAME};
use crate::render::{graph_layout, report_view, GraphLayout, ReportView};
use crate::report::{CoordinationMessage, CoordinationReport, CoordinationResult};
use crate::roster::{AgentProfile, AgentRoster};
use crate::scenario::{scenario_text, Disruption, DEMAND_SIGNAL_TRIGGER};

pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationRequest {
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub disruption: Option<Disruption>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CoordinationOutcome {
    pub success: bool,
    pub session_id: String,
    pub agents: Vec<AgentProfile>,
    pub messages: Vec<CoordinationMessage>,
    pub report: Value,
}

/// A stored session with everything needed to replay it.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SessionDetail {
    pub session: CoordinationSession,
    pub messages: Vec<AgentMessage>,
    pub report: Option<ReportView>,
    pub graph: Option<GraphLayout>,
}

#[derive(Clone)]
pub struct Coordinator {
    llm: Arc<dyn ToolCallingLlm>,
    store: SqliteStore,
    roster: Arc<AgentRoster>,
    model: String,
}

impl Coordinator {
    pub fn new(llm: Arc<dyn ToolCallingLlm>, store: SqliteStore, roster: Arc<AgentRoster>) -> Self {
        Self {
            llm,
            store,
            roster,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn roster(&self) -> &AgentRoster {
        &self.roster
    }

    /// Opens a session, asks the model to simulate the exchange, then stores
    /// the messages and closes the session with the report.
    ///
    /// When the model call fails the session is left `running`.
    pub async fn run(
        &self,
        ctx: &UserContext,
        request: CoordinationRequest,
    ) -> Result<CoordinationOutcome, NetworkError> {
        let trigger_type = request
            .trigger_type
            .as_deref()
            .filter(|trigger| !trigger.trim().is_empty())
            .unwrap_or(DEMAND_SIGNAL_TRIGGER);
        let session = self.store.create_session(ctx, trigger_type).await?;

        let sales = self.store.list_sales(ctx).await?;
        let inventory: Vec<_> = summarize_products(&sales)
            .iter()
            .map(|product| product.inventory_view())
            .collect();
        let scenario = scenario_text(request.disruption.as_ref(), &inventory)
            .map_err(NetworkError::InvalidToolOutput)?;

        let llm_request = LlmRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(system_prompt(&self.roster)),
                Message::user(scenario),
            ],
            tools: vec![tool_spec()],
            tool_choice: Some(TOOL_NAME.to_string()),
        };

        let span = tracing::info_span!(
            "agent_coordination",
            session_id = %session.id,
            trigger_type = trigger_type,
            products = inventory.len(),
        );
        let response = match self.llm.invoke(llm_request).instrument(span).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, session_id = %session.id, "agent coordination failed");
                return Err(err.into());
            }
        };

        let call = response
            .tool_calls
            .into_iter()
            .next()
            .ok_or(NetworkError::MissingToolCall)?;
        let result: CoordinationResult =
            serde_json::from_value(call.args).map_err(NetworkError::InvalidToolOutput)?;

        if !result.messages.is_empty() {
            let rows: Vec<NewAgentMessage> = result
                .messages
                .iter()
                .map(CoordinationMessage::to_new_agent_message)
                .collect();
            self.store
                .insert_agent_messages(ctx, &session.id, &rows)
                .await?;
        }
        self.store
            .complete_session(ctx, &session.id, &result.report)
            .await?;

        tracing::info!(
            session_id = %session.id,
            messages = result.messages.len(),
            "agent coordination completed"
        );

        Ok(CoordinationOutcome {
            success: true,
            session_id: session.id,
            agents: self.roster.agents().to_vec(),
            messages: result.messages,
            report: result.report,
        })
    }

    pub async fn sessions(
        &self,
        ctx: &UserContext,
    ) -> Result<Vec<CoordinationSession>, NetworkError> {
        Ok(self.store.list_sessions(ctx).await?)
    }

    pub async fn session_detail(
        &self,
        ctx: &UserContext,
        session_id: &str,
    ) -> Result<Option<SessionDetail>, NetworkError> {
        let Some(session) = self.store.get_session(ctx, session_id).await? else {
            return Ok(None);
        };
        let messages = self.store.list_agent_messages(ctx, session_id).await?;

        let typed = session.report.as_ref().map(CoordinationReport::from_value);
        let report = typed
            .as_ref()
            .map(|report| report_view(report, messages.len(), &self.roster));
        let graph = typed
            .as_ref()
            .and_then(|report| report.graph.as_ref())
            .map(graph_layout);

        Ok(Some(SessionDetail {
            session,
            messages,
            report,
            graph,
        }))
    }
}
