use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde_json::{json, Value};
use supplysense_core::{
    InsightStatus, LlmRequest, LlmResponse, NewSalesRecord, SupplySenseError, ToolCall,
    ToolCallingLlm, UserContext,
};
use supplysense_insights::{AnalysisOutcome, InsightAnalyzer, InsightError};
use supplysense_store::SqliteStore;

struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<LlmResponse, SupplySenseError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    fn new(replies: Vec<Result<LlmResponse, SupplySenseError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl ToolCallingLlm for ScriptedLlm {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, SupplySenseError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SupplySenseError::LlmProvider("no scripted reply".to_string())))
    }
}

fn tool_reply(args: Value) -> Result<LlmResponse, SupplySenseError> {
    Ok(LlmResponse {
        content: String::new(),
        tool_calls: vec![ToolCall {
            id: "call_1".to_string(),
            name: "supply_chain_analysis".to_string(),
            args,
        }],
    })
}

fn insight(product: &str, status: &str) -> Value {
    json!({
        "product_name": product,
        "status": status,
        "risk_level": "medium",
        "recommendation": "Monitor",
        "explanation": "Stock covers expected demand.",
        "recommended_order_qty": 0
    })
}

async fn seeded_store(ctx: &UserContext) -> SqliteStore {
    let store = SqliteStore::builder("sqlite::memory:")
        .build()
        .await
        .expect("store");
    let upload = store
        .insert_upload(ctx, "sales.csv", 3)
        .await
        .expect("upload");
    let rows: Vec<NewSalesRecord> = [("Mouse", 1, 4), ("Keyboard", 1, 2), ("Mouse", 2, 6)]
        .into_iter()
        .map(|(name, day, qty)| NewSalesRecord {
            product_name: name.to_string(),
            sale_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            quantity_sold: qty,
            unit_price: 10.0,
            current_stock: 30,
            reorder_point: 12,
        })
        .collect();
    store
        .insert_sales_batch(ctx, &upload.id, &rows)
        .await
        .expect("sales");
    store
}

#[tokio::test]
async fn second_run_replaces_first_run_insights() {
    let ctx = UserContext::new("user-1").unwrap();
    let store = seeded_store(&ctx).await;
    let llm = ScriptedLlm::new(vec![
        tool_reply(json!({"insights": [insight("Mouse", "healthy"), insight("Keyboard", "at_risk")]})),
        tool_reply(json!({"insights": [insight("Mouse", "critical")]})),
    ]);
    let analyzer = InsightAnalyzer::new(llm.clone(), store.clone());

    let first = analyzer.run(&ctx).await.unwrap();
    assert_eq!(first, AnalysisOutcome { success: true, count: 2 });
    let second = analyzer.run(&ctx).await.unwrap();
    assert_eq!(second.count, 1);

    let stored = store.list_insights(&ctx).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].product_name, "Mouse");
    assert_eq!(stored[0].status, InsightStatus::Critical);
    assert!(stored[0].upload_id.is_some());
}

#[tokio::test]
async fn request_forces_the_analysis_tool() {
    let ctx = UserContext::new("user-1").unwrap();
    let store = seeded_store(&ctx).await;
    let llm = ScriptedLlm::new(vec![tool_reply(json!({"insights": []}))]);
    let analyzer = InsightAnalyzer::new(llm.clone(), store).with_model("test-model");

    analyzer.run(&ctx).await.unwrap();

    let requests = llm.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.model, "test-model");
    assert_eq!(request.tool_choice.as_deref(), Some("supply_chain_analysis"));
    assert_eq!(request.tools[0].name, "supply_chain_analysis");
    let user = &request.messages[1].content;
    assert!(user.starts_with("Analyze these products:\n"));
    // Mouse appears first and averages (4 + 6) / 2.
    let products: Value =
        serde_json::from_str(user.trim_start_matches("Analyze these products:\n")).unwrap();
    assert_eq!(products[0]["name"], "Mouse");
    assert_eq!(products[0]["avgDailySales"], 5.0);
    assert_eq!(products[0]["daysOfStock"], 6);
    assert_eq!(products[1]["name"], "Keyboard");
}

#[tokio::test]
async fn provider_rate_limit_keeps_its_own_message() {
    let ctx = UserContext::new("user-1").unwrap();
    let store = seeded_store(&ctx).await;
    let llm = ScriptedLlm::new(vec![Err(SupplySenseError::RateLimited("429".to_string()))]);
    let analyzer = InsightAnalyzer::new(llm, store);

    let err = analyzer.run(&ctx).await.unwrap_err();

    assert_eq!(err.status_code(), 429);
    assert_eq!(
        err.to_string(),
        "Rate limit exceeded. Please try again in a moment."
    );
}

#[tokio::test]
async fn quota_and_generic_failures_are_distinct() {
    let ctx = UserContext::new("user-1").unwrap();
    let store = seeded_store(&ctx).await;
    let llm = ScriptedLlm::new(vec![
        Err(SupplySenseError::QuotaExhausted("402".to_string())),
        Err(SupplySenseError::LlmProvider("500".to_string())),
    ]);
    let analyzer = InsightAnalyzer::new(llm, store);

    let quota = analyzer.run(&ctx).await.unwrap_err();
    assert_eq!(quota.status_code(), 402);
    assert_eq!(quota.to_string(), "AI credits exhausted. Please add credits in Settings.");

    let generic = analyzer.run(&ctx).await.unwrap_err();
    assert_eq!(generic.status_code(), 500);
    assert_eq!(generic.to_string(), "AI analysis failed");
}

#[tokio::test]
async fn missing_tool_call_leaves_insights_untouched() {
    let ctx = UserContext::new("user-1").unwrap();
    let store = seeded_store(&ctx).await;
    let llm = ScriptedLlm::new(vec![
        tool_reply(json!({"insights": [insight("Mouse", "healthy")]})),
        Ok(LlmResponse {
            content: "[]".to_string(),
            tool_calls: vec![],
        }),
    ]);
    let analyzer = InsightAnalyzer::new(llm, store.clone());

    analyzer.run(&ctx).await.unwrap();
    let err = analyzer.run(&ctx).await.unwrap_err();

    assert!(matches!(err, InsightError::MissingToolCall));
    assert_eq!(err.to_string(), "AI did not return expected tool call");
    assert_eq!(store.list_insights(&ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn user_without_sales_gets_upload_hint() {
    let store = SqliteStore::builder("sqlite::memory:")
        .build()
        .await
        .unwrap();
    let llm = ScriptedLlm::new(vec![]);
    let analyzer = InsightAnalyzer::new(llm.clone(), store);

    let err = analyzer
        .run(&UserContext::new("nobody").unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "No sales data found. Please upload data first.");
    assert!(llm.requests.lock().unwrap().is_empty());
}
