//! Client for any provider speaking the OpenAI chat-completions format.
//!
//! Requests always go out non-streaming. When `tool_choice` is set on the
//! request the named function is forced, and its JSON-string arguments are
//! decoded into a [`ToolCall`].

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use supplysense_core::{
    LlmRequest, LlmResponse, Message, SupplySenseError, ToolCall, ToolCallingLlm, ToolSpec,
};
use tracing::Instrument;
use url::Url;

use crate::error::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<FunctionTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    pub stream: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: ToolSpec,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<Choice>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ResponseToolCall {
    #[serde(default)]
    pub id: String,
    pub function: FunctionCall,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FunctionCall {
    pub name: String,
    /// JSON document encoded as a string.
    pub arguments: String,
}

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http: Client,
    endpoint: Url,
    api_key: Option<SecretString>,
    default_model: String,
}

#[derive(Clone)]
pub struct OpenAiCompatibleBuilder {
    base_url: String,
    api_key: Option<SecretString>,
    default_model: String,
    timeout: Duration,
}

impl Default for OpenAiCompatibleBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            default_model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl OpenAiCompatibleBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenAiCompatibleClient, LlmError> {
        let endpoint = Url::parse(&format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        ))?;
        let http = Client::builder().timeout(self.timeout).build()?;

        Ok(OpenAiCompatibleClient {
            http,
            endpoint,
            api_key: self.api_key,
            default_model: self.default_model,
        })
    }
}

impl OpenAiCompatibleClient {
    pub fn builder() -> OpenAiCompatibleBuilder {
        OpenAiCompatibleBuilder::default()
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn set_default_model(&mut self, model: impl Into<String>) {
        self.default_model = model.into();
    }

    pub async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = self.wire_request(request);
        let span = tracing::info_span!(
            "llm_chat_completion",
            model = %body.model,
            forced_tool = body.tool_choice.is_some(),
        );

        async move {
            let mut builder = self.http.post(self.endpoint.clone()).json(&body);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key.expose_secret());
            }

            let response = builder.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), "llm provider returned an error");
                return Err(LlmError::from_status(status, body));
            }

            let completion: ChatCompletionResponse = response.json().await?;
            into_llm_response(completion)
        }
        .instrument(span)
        .await
    }

    fn wire_request(&self, request: LlmRequest) -> ChatCompletionRequest {
        let LlmRequest {
            model,
            messages,
            tools,
            tool_choice,
        } = request;
        let model = if model.is_empty() {
            self.default_model.clone()
        } else {
            model
        };
        let tools = if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .into_iter()
                    .map(|function| FunctionTool {
                        kind: "function",
                        function,
                    })
                    .collect(),
            )
        };
        let tool_choice =
            tool_choice.map(|name| json!({ "type": "function", "function": { "name": name } }));

        ChatCompletionRequest {
            model,
            messages,
            tools,
            tool_choice,
            stream: false,
        }
    }
}

fn into_llm_response(completion: ChatCompletionResponse) -> Result<LlmResponse, LlmError> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            let args = serde_json::from_str(&call.function.arguments).map_err(|err| {
                LlmError::InvalidArguments {
                    name: call.function.name.clone(),
                    reason: err.to_string(),
                }
            })?;
            Ok(ToolCall {
                id: call.id,
                name: call.function.name,
                args,
            })
        })
        .collect::<Result<Vec<_>, LlmError>>()?;

    Ok(LlmResponse {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
    })
}

#[async_trait::async_trait]
impl ToolCallingLlm for OpenAiCompatibleClient {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, SupplySenseError> {
        self.chat(request).await.map_err(SupplySenseError::from)
    }
}
