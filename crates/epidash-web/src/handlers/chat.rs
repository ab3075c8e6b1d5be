//! `POST /api/chat`: talk to the dashboard assistant.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use epidash_llm::ChatMode;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::sse::chat_events;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Ask for a strict-JSON chart intent instead of prose.
    #[serde(default, rename = "isJSONRequest")]
    pub is_json_request: bool,
    #[serde(default)]
    pub stream: bool,
}

pub async fn chat(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let message = payload
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("Bad request", "Message is required"))?;

    let mode = ChatMode::select(message, payload.is_json_request);

    if payload.stream {
        let tokens = state.assistant.stream(mode, message).await?;
        return Ok(chat_events(tokens).into_response());
    }

    let reply = match mode {
        ChatMode::Json => state.assistant.extract_intent(message).await?,
        _ => json!(state.assistant.answer(mode, message).await?),
    };
    Ok(Json(json!({ "reply": reply })).into_response())
}
