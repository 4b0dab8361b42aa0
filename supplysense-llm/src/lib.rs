pub mod error;
pub mod openai_compatible;

pub use error::LlmError;
pub use openai_compatible::{
    ChatCompletionRequest, OpenAiCompatibleBuilder, OpenAiCompatibleClient, DEFAULT_BASE_URL,
    DEFAULT_MODEL,
};
pub use supplysense_core::{LlmRequest, LlmResponse, Message, Role, ToolCall, ToolCallingLlm, ToolSpec};
