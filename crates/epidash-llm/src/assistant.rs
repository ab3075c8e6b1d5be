//! Dashboard assistant: picks a prompt for a message and calls the backend.

use std::sync::Arc;

use epidash_analytics::request::strip_code_fence;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{LlmBackend, LlmError, LlmRequest, Message, TokenStream};
use crate::intent::is_visualization_query;
use crate::prompts::{self, DashboardContext};

/// Which system prompt a chat message is answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Strict JSON intent extraction.
    Json,
    /// Factual health question.
    General,
    /// Looks like a chart request; help the user phrase it.
    Guided,
}

impl ChatMode {
    pub fn select(message: &str, json_request: bool) -> Self {
        if json_request {
            ChatMode::Json
        } else if is_visualization_query(message) {
            ChatMode::Guided
        } else {
            ChatMode::General
        }
    }

    /// Factual answers run cooler than the conversational modes.
    pub fn temperature(self) -> f32 {
        match self {
            ChatMode::General => 0.3,
            ChatMode::Json | ChatMode::Guided => 0.7,
        }
    }
}

const DASHBOARD_TEMPERATURE: f32 = 0.6;
const EMPTY_REPLY: &str = "No response generated.";

pub struct Assistant {
    backend: Arc<dyn LlmBackend>,
    context: DashboardContext,
    max_tokens: u32,
}

impl Assistant {
    pub fn new(backend: Arc<dyn LlmBackend>, context: DashboardContext) -> Self {
        Self { backend, context, max_tokens: 1000 }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }

    fn request(&self, system: String, user: &str, temperature: f32, json_mode: bool) -> LlmRequest {
        LlmRequest {
            messages: vec![Message::system(system), Message::user(user)],
            model: None,
            max_tokens: Some(self.max_tokens),
            temperature: Some(temperature),
            json_mode,
        }
    }

    pub fn request_for(&self, mode: ChatMode, message: &str) -> LlmRequest {
        let system = match mode {
            ChatMode::Json => prompts::intent_prompt(&self.context),
            ChatMode::General => prompts::general_prompt(&self.context),
            ChatMode::Guided => prompts::guided_prompt(&self.context),
        };
        self.request(system, message, mode.temperature(), mode == ChatMode::Json)
    }

    /// Ask for a strict-JSON chart intent. A reply that is not valid JSON
    /// (after stripping markdown fences) fails the request.
    pub async fn extract_intent(&self, message: &str) -> Result<Value, LlmError> {
        let resp = self.backend.complete(self.request_for(ChatMode::Json, message)).await?;
        let text = strip_code_fence(&resp.content);
        serde_json::from_str(text).map_err(|e| {
            warn!(error = %e, "model returned invalid JSON");
            LlmError::InvalidJson(e.to_string())
        })
    }

    /// Plain-text answer in the given mode.
    pub async fn answer(&self, mode: ChatMode, message: &str) -> Result<String, LlmError> {
        debug!(?mode, model = self.model_id(), "answering chat message");
        let resp = self.backend.complete(self.request_for(mode, message)).await?;
        Ok(resp.content)
    }

    pub async fn stream(&self, mode: ChatMode, message: &str) -> Result<TokenStream, LlmError> {
        debug!(?mode, model = self.model_id(), "streaming chat message");
        self.backend.complete_stream(self.request_for(mode, message)).await
    }

    /// Dashboard question: the reply is either chart-request JSON or prose.
    pub async fn answer_dashboard(&self, question: &str) -> Result<String, LlmError> {
        let req = self.request(
            prompts::dashboard_prompt(&self.context),
            question,
            DASHBOARD_TEMPERATURE,
            false,
        );
        let resp = self.backend.complete(req).await?;
        if resp.content.trim().is_empty() {
            return Ok(EMPTY_REPLY.to_string());
        }
        Ok(resp.content)
    }
}
