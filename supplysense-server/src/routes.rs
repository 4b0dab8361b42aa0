use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use supplysense_core::{
    build_dashboard, CoordinationSession, DashboardView, Insight, NewSalesRecord, Upload,
    UserContext,
};
use supplysense_ingest::{import, parse_csv};
use supplysense_insights::AnalysisOutcome;
use supplysense_network::{
    paced, scenario_catalogue, AgentProfile, CoordinationOutcome, CoordinationRequest, Scenario,
    SessionDetail,
};
use supplysense_voice::briefing_text;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;
use crate::user::CurrentUser;

/// Largest accepted request body; CSV uploads are the big ones.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

const DEFAULT_FILE_NAME: &str = "upload.csv";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/uploads", get(list_uploads).post(create_upload))
        .route("/api/uploads/preview", post(preview_upload))
        .route("/api/uploads/:id", delete(delete_upload))
        .route("/api/dashboard", get(dashboard))
        .route("/api/insights", get(list_insights))
        .route("/api/briefing", get(briefing))
        .route("/api/agents", get(list_agents))
        .route("/api/scenarios", get(list_scenarios))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/:id", get(session_detail))
        .route("/api/sessions/:id/timeline", get(session_timeline))
        .route("/functions/analyze-supply-chain", post(analyze_supply_chain))
        .route("/functions/agent-network", post(agent_network))
        .route("/functions/voice-briefing", post(voice_briefing))
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    file_name: Option<String>,
}

impl UploadQuery {
    fn file_name(&self) -> &str {
        self.file_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub upload: Upload,
    pub inserted: usize,
    pub batches: usize,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub file_name: String,
    pub row_count: usize,
    pub preview: Vec<NewSalesRecord>,
}

async fn create_upload(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportResponse>), ApiError> {
    let parsed = parse_csv(query.file_name(), &body)?;
    let summary = import(&ctx, &parsed, &state.store).await?;
    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            upload: summary.upload,
            inserted: summary.inserted,
            batches: summary.batches,
        }),
    ))
}

async fn preview_upload(
    CurrentUser(_ctx): CurrentUser,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<PreviewResponse>, ApiError> {
    let parsed = parse_csv(query.file_name(), &body)?;
    Ok(Json(PreviewResponse {
        file_name: parsed.file_name().to_string(),
        row_count: parsed.row_count(),
        preview: parsed.preview().to_vec(),
    }))
}

async fn list_uploads(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<Vec<Upload>>, ApiError> {
    Ok(Json(state.store.list_uploads(&ctx).await?))
}

async fn delete_upload(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete_upload(&ctx, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Upload not found"))
    }
}

async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<DashboardView>, ApiError> {
    let sales = state.store.list_sales(&ctx).await?;
    let insights = state.store.list_insights(&ctx).await?;
    Ok(Json(build_dashboard(&sales, &insights)))
}

/// An insight table row, newest first.
#[derive(Debug, Serialize)]
pub struct InsightRow {
    #[serde(flatten)]
    pub insight: Insight,
    pub status_label: &'static str,
}

async fn list_insights(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<Vec<InsightRow>>, ApiError> {
    let rows = state
        .store
        .list_insights(&ctx)
        .await?
        .into_iter()
        .map(|insight| InsightRow {
            status_label: insight.status.label(),
            insight,
        })
        .collect();
    Ok(Json(rows))
}

async fn briefing(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let insights = state.store.list_insights(&ctx).await?;
    Ok(Json(json!({ "text": briefing_text(&insights) })))
}

async fn list_agents(State(state): State<AppState>) -> Json<Vec<AgentProfile>> {
    Json(state.coordinator.roster().agents().to_vec())
}

async fn list_scenarios() -> Json<Vec<Scenario>> {
    Json(scenario_catalogue())
}

async fn list_sessions(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<Vec<CoordinationSession>>, ApiError> {
    Ok(Json(state.coordinator.sessions(&ctx).await?))
}

async fn load_session(
    state: &AppState,
    ctx: &UserContext,
    id: &str,
) -> Result<SessionDetail, ApiError> {
    state
        .coordinator
        .session_detail(ctx, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))
}

async fn session_detail(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, ApiError> {
    Ok(Json(load_session(&state, &ctx, &id).await?))
}

/// Replays a stored session as server-sent events: one `message` event per
/// agent message at the reveal interval, then `report` when the session has
/// one, then `done`.
async fn session_timeline(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let detail = load_session(&state, &ctx, &id).await?;

    let messages = paced(detail.messages, state.reveal_interval)
        .map(|message| json_event("message", &message));
    let report = detail
        .report
        .filter(|report| report.is_displayable())
        .map(|report| json_event("report", &report));
    let done = Event::default().event("done").data(id);

    let events = messages
        .chain(stream::iter(report))
        .chain(stream::once(async move { done }))
        .map(Ok::<_, Infallible>);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn json_event<T: Serialize>(name: &str, value: &T) -> Event {
    match Event::default().event(name).json_data(value) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, event = name, "failed to encode timeline event");
            Event::default().event("error").data(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    user_id: String,
}

async fn analyze_supply_chain(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisOutcome>, ApiError> {
    let ctx = UserContext::new(request.user_id)?;
    Ok(Json(state.analyzer.run(&ctx).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentNetworkRequest {
    #[serde(default)]
    user_id: String,
    #[serde(flatten)]
    coordination: CoordinationRequest,
}

async fn agent_network(
    State(state): State<AppState>,
    Json(request): Json<AgentNetworkRequest>,
) -> Result<Json<CoordinationOutcome>, ApiError> {
    let ctx = UserContext::new(request.user_id)?;
    Ok(Json(state.coordinator.run(&ctx, request.coordination).await?))
}

#[derive(Debug, Deserialize)]
pub struct VoiceBriefingRequest {
    #[serde(default)]
    text: String,
}

async fn voice_briefing(
    State(state): State<AppState>,
    Json(request): Json<VoiceBriefingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let audio = state.tts.synthesize(&request.text).await?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}
