//! epidash-llm: Language-model access for the dashboard.
//!
//! [`backend`] speaks the OpenAI chat-completions wire format (OpenAI,
//! compatible gateways, local Ollama). [`assistant`] holds the dashboard's
//! prompts and turns user messages into chart intents or plain answers.

pub mod backend;
pub mod intent;
pub mod prompts;
pub mod assistant;

pub use backend::{
    LlmBackend, LlmError, LlmRequest, LlmResponse, Message, OllamaBackend, OpenAiBackend,
    OpenAiCompatibleBackend, TokenStream,
};
pub use intent::is_visualization_query;
pub use prompts::DashboardContext;
pub use assistant::{Assistant, ChatMode};
