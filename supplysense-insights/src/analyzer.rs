use std::sync::Arc;

use serde::{Deserialize, Serialize};
use supplysense_core::{
    summarize_products, LlmRequest, Message, NewInsight, ToolCallingLlm, UserContext,
};
use supplysense_store::SqliteStore;
use tracing::Instrument;

use crate::error::InsightError;
use crate::prompt::{tool_spec, user_message, SYSTEM_PROMPT, TOOL_NAME};

pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub success: bool,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
struct AnalysisToolOutput {
    insights: Vec<NewInsight>,
}

/// Runs one analysis: summarise sales, ask the model, replace stored insights.
#[derive(Clone)]
pub struct InsightAnalyzer {
    llm: Arc<dyn ToolCallingLlm>,
    store: SqliteStore,
    model: String,
}

impl InsightAnalyzer {
    pub fn new(llm: Arc<dyn ToolCallingLlm>, store: SqliteStore) -> Self {
        Self {
            llm,
            store,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub async fn run(&self, ctx: &UserContext) -> Result<AnalysisOutcome, InsightError> {
        let sales = self.store.list_sales(ctx).await?;
        if sales.is_empty() {
            return Err(InsightError::NoSalesData);
        }
        let upload = self
            .store
            .latest_upload(ctx)
            .await?
            .ok_or(InsightError::NoUpload)?;

        let products: Vec<_> = summarize_products(&sales)
            .iter()
            .map(|product| product.analysis_view())
            .collect();
        let request = LlmRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(SYSTEM_PROMPT),
                Message::user(user_message(&products).map_err(InsightError::InvalidToolOutput)?),
            ],
            tools: vec![tool_spec()],
            tool_choice: Some(TOOL_NAME.to_string()),
        };

        let span = tracing::info_span!(
            "insight_analysis",
            user_id = ctx.user_id(),
            products = products.len(),
            model = %self.model,
        );
        let response = match self.llm.invoke(request).instrument(span).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, user_id = ctx.user_id(), "insight analysis failed");
                return Err(err.into());
            }
        };

        let call = response
            .tool_calls
            .into_iter()
            .next()
            .ok_or(InsightError::MissingToolCall)?;
        let output: AnalysisToolOutput =
            serde_json::from_value(call.args).map_err(InsightError::InvalidToolOutput)?;

        let stored = self
            .store
            .replace_insights(ctx, Some(&upload.id), &output.insights)
            .await?;
        tracing::info!(user_id = ctx.user_id(), count = stored.len(), "insights replaced");

        Ok(AnalysisOutcome {
            success: true,
            count: stored.len(),
        })
    }
}
