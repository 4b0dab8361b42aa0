use httpmock::prelude::*;
use secrecy::SecretString;
use serde_json::json;
use supplysense_core::SupplySenseError;
use supplysense_llm::{
    LlmError, LlmRequest, Message, OpenAiCompatibleClient, ToolCallingLlm, ToolSpec,
};

fn client(server: &MockServer) -> OpenAiCompatibleClient {
    OpenAiCompatibleClient::builder()
        .base_url(server.url("/v1"))
        .api_key(SecretString::new("test-key".to_string()))
        .default_model("test-model")
        .build()
        .expect("client")
}

fn forced_request() -> LlmRequest {
    LlmRequest {
        model: String::new(),
        messages: vec![Message::system("be terse"), Message::user("hi")],
        tools: vec![ToolSpec {
            name: "report".to_string(),
            description: "Return a report".to_string(),
            parameters: json!({"type": "object", "properties": {"ok": {"type": "boolean"}}}),
        }],
        tool_choice: Some("report".to_string()),
    }
}

#[tokio::test]
async fn tool_call_arguments_are_decoded() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer test-key")
            .json_body_partial(
                r#"{"model": "test-model", "tool_choice": {"type": "function", "function": {"name": "report"}}}"#,
            );
        then.status(200).json_body(json!({
            "id": "chatcmpl-1",
            "model": "test-model",
            "choices": [{
                "index": 0,
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "report", "arguments": "{\"ok\": true}"}
                    }]
                }
            }]
        }));
    });

    let response = client(&server)
        .invoke(forced_request())
        .await
        .expect("invoke");

    mock.assert();
    let call = response.first_tool_call().expect("tool call");
    assert_eq!(call.name, "report");
    assert_eq!(call.id, "call_1");
    assert_eq!(call.args, json!({"ok": true}));
    assert_eq!(response.content, "");
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(429).body("slow down");
    });

    let err = client(&server)
        .invoke(forced_request())
        .await
        .expect_err("429 should fail");

    assert!(matches!(err, SupplySenseError::RateLimited(ref body) if body == "slow down"));
    assert_eq!(err.provider_status(), Some(429));
}

#[tokio::test]
async fn payment_required_maps_to_quota_exhausted() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(402).body("no credits");
    });

    let err = client(&server)
        .chat(forced_request())
        .await
        .expect_err("402 should fail");

    assert!(matches!(err, LlmError::QuotaExhausted { .. }));
}

#[tokio::test]
async fn server_error_is_a_generic_provider_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(500).body("boom");
    });

    let err = client(&server)
        .invoke(forced_request())
        .await
        .expect_err("500 should fail");

    assert!(matches!(err, SupplySenseError::LlmProvider(_)));
    assert_eq!(err.provider_status(), None);
}

#[tokio::test]
async fn malformed_arguments_are_a_parse_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "id": "call_1",
                        "function": {"name": "report", "arguments": "{not json"}
                    }]
                }
            }]
        }));
    });

    let err = client(&server)
        .invoke(forced_request())
        .await
        .expect_err("bad arguments should fail");

    assert!(matches!(err, SupplySenseError::ParseFailed { .. }));
}
