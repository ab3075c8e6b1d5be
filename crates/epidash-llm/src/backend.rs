//! LLM backend trait and concrete implementations.
//!
//! Backends (all speak the OpenAI chat-completions format):
//!   OpenAiBackend           - OpenAI API (gpt-4o, gpt-4o-mini, …)
//!   OpenAiCompatibleBackend - any OpenAI-compatible endpoint (LMStudio,
//!                             TogetherAI, Groq, OpenRouter, vLLM, …)
//!   OllamaBackend           - local Ollama via its /v1 endpoint

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use epidash_common::EpidashError;
use futures_util::{stream, Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid JSON response from model: {0}")]
    InvalidJson(String),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
}

impl From<LlmError> for EpidashError {
    fn from(err: LlmError) -> Self {
        EpidashError::Upstream(err.to_string())
    }
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask for `response_format: {"type": "json_object"}`.
    #[serde(default)]
    pub json_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Content deltas of a streamed completion, in order.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Stream the completion. The default runs [`LlmBackend::complete`] and
    /// yields the whole reply as a single delta.
    async fn complete_stream(&self, req: LlmRequest) -> Result<TokenStream, LlmError> {
        let resp = self.complete(req).await?;
        Ok(Box::pin(stream::once(async move { Ok(resp.content) })))
    }

    fn model_id(&self) -> &str;
    fn is_local(&self) -> bool;
}

// ── Helpers: OpenAI wire format ───────────────────────────────────────────────

const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.7;

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

fn chat_body(req: &LlmRequest, default_model: &str, stream: bool) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model":       req.model.as_deref().unwrap_or(default_model),
        "messages":    req.messages,
        "max_tokens":  req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "temperature": req.temperature.unwrap_or(DEFAULT_TEMPERATURE),
    });
    if req.json_mode {
        body["response_format"] = serde_json::json!({"type": "json_object"});
    }
    if stream {
        body["stream"] = serde_json::Value::Bool(true);
    }
    body
}

fn parse_openai_response(json: &serde_json::Value, fallback_model: &str) -> LlmResponse {
    LlmResponse {
        content: json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        model: json["model"]
            .as_str()
            .unwrap_or(fallback_model)
            .to_string(),
        prompt_tokens:     json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    }
}

fn api_error(status: u16, body: &serde_json::Value) -> LlmError {
    let message = body["error"]["message"]
        .as_str()
        .or_else(|| body["message"].as_str())
        .or_else(|| body["error"].as_str())
        .unwrap_or("unknown API error")
        .to_string();
    LlmError::ApiError { status, message }
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().await?;
    if status >= 400 {
        return Err(api_error(status, &body));
    }
    Ok(body)
}

/// One line of a chat-completions event stream.
#[derive(Debug, PartialEq)]
enum SseLine {
    Delta(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }
    serde_json::from_str::<serde_json::Value>(data)
        .ok()
        .and_then(|v| v["choices"][0]["delta"]["content"].as_str().map(str::to_string))
        .filter(|s| !s.is_empty())
        .map(SseLine::Delta)
        .unwrap_or(SseLine::Skip)
}

/// Split a chat-completions event stream into content deltas.
fn delta_stream<S, B>(bytes: S) -> TokenStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = Some((Box::pin(bytes), Vec::<u8>::new()));
    let deltas = stream::unfold(state, |state| async move {
        let (mut bytes, mut buf) = state?;
        loop {
            if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                match parse_sse_line(String::from_utf8_lossy(&line).trim()) {
                    SseLine::Delta(text) => return Some((Ok(text), Some((bytes, buf)))),
                    SseLine::Done => return None,
                    SseLine::Skip => continue,
                }
            }
            match bytes.next().await {
                Some(Ok(chunk)) => buf.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => return Some((Err(LlmError::Http(e)), None)),
                None => {
                    let rest = std::mem::take(&mut buf);
                    return match parse_sse_line(String::from_utf8_lossy(&rest).trim()) {
                        SseLine::Delta(text) => Some((Ok(text), None)),
                        _ => None,
                    };
                }
            }
        }
    });
    Box::pin(deltas)
}

async fn open_stream(resp: reqwest::Response) -> Result<TokenStream, LlmError> {
    let status = resp.status().as_u16();
    if status >= 400 {
        let body: serde_json::Value = resp.json().await.unwrap_or_default();
        return Err(api_error(status, &body));
    }
    Ok(delta_stream(resp.bytes_stream()))
}

fn log_usage(resp: &LlmResponse) {
    info!(
        model = %resp.model,
        prompt_tokens = resp.prompt_tokens,
        completion_tokens = resp.completion_tokens,
        "LLM completion"
    );
}

// ── 1. OpenAI ─────────────────────────────────────────────────────────────────

pub struct OpenAiBackend {
    pub model: String,
    pub base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key,
            client: http_client(Duration::from_secs(60)),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = chat_body(&req, &self.model, false);
        let resp = self.client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;
        let out = parse_openai_response(&json, &self.model);
        log_usage(&out);
        Ok(out)
    }

    async fn complete_stream(&self, req: LlmRequest) -> Result<TokenStream, LlmError> {
        let body = chat_body(&req, &self.model, true);
        let resp = self.client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;
        open_stream(resp).await
    }

    fn model_id(&self) -> &str { &self.model }
    fn is_local(&self) -> bool { false }
}

// ── 2. OpenAI-compatible (LMStudio, Groq, OpenRouter, vLLM, …) ───────────────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client: http_client(Duration::from_secs(60)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(k) => req.bearer_auth(k.expose_secret()),
            None => req,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = chat_body(&req, &self.model, false);
        let resp = self.auth(self.client.post(self.endpoint())).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        let out = parse_openai_response(&json, &self.model);
        log_usage(&out);
        Ok(out)
    }

    async fn complete_stream(&self, req: LlmRequest) -> Result<TokenStream, LlmError> {
        let body = chat_body(&req, &self.model, true);
        let resp = self.auth(self.client.post(self.endpoint())).json(&body).send().await?;
        open_stream(resp).await
    }

    fn model_id(&self) -> &str { &self.model }
    fn is_local(&self) -> bool { false }
}

// ── 3. Ollama (local) ─────────────────────────────────────────────────────────

pub struct OllamaBackend {
    pub base_url: String,
    pub model: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            // Local models can be slow to load on first use.
            client: http_client(Duration::from_secs(300)),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = chat_body(&req, &self.model, false);
        let resp = self.client.post(self.endpoint()).json(&body).send().await
            .map_err(|e| if e.is_connect() {
                LlmError::Unavailable(format!("Ollama not reachable at {}", self.base_url))
            } else {
                LlmError::Http(e)
            })?;
        let json = check_response_status(resp).await?;
        let out = parse_openai_response(&json, &self.model);
        log_usage(&out);
        Ok(out)
    }

    async fn complete_stream(&self, req: LlmRequest) -> Result<TokenStream, LlmError> {
        let body = chat_body(&req, &self.model, true);
        let resp = self.client.post(self.endpoint()).json(&body).send().await?;
        open_stream(resp).await
    }

    fn model_id(&self) -> &str { &self.model }
    fn is_local(&self) -> bool { true }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SecretString {
        SecretString::from("sk-test".to_string())
    }

    #[test]
    fn test_openai_backend_is_not_local() {
        let b = OpenAiBackend::new(key(), "gpt-4o");
        assert!(!b.is_local());
        assert_eq!(b.model_id(), "gpt-4o");
        assert_eq!(b.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_openai_base_url_override() {
        let b = OpenAiBackend::new(key(), "gpt-4o").with_base_url("https://proxy.local/v1/");
        assert_eq!(b.endpoint(), "https://proxy.local/v1/chat/completions");
    }

    #[test]
    fn test_openai_compatible_with_no_key() {
        let b = OpenAiCompatibleBackend::new("http://localhost:1234", "local-model", None);
        assert_eq!(b.model_id(), "local-model");
        assert_eq!(b.endpoint(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn test_ollama_is_local() {
        let b = OllamaBackend::new("http://localhost:11434", "llama3:8b");
        assert!(b.is_local());
    }

    #[test]
    fn test_chat_body_json_mode_and_stream() {
        let req = LlmRequest {
            messages: vec![Message::system("s"), Message::user("u")],
            temperature: Some(0.3),
            json_mode: true,
            ..Default::default()
        };
        let body = chat_body(&req, "gpt-4o", true);
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn test_chat_body_plain() {
        let req = LlmRequest { model: Some("gpt-4o-mini".into()), ..Default::default() };
        let body = chat_body(&req, "gpt-4o", false);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert!(body.get("response_format").is_none());
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_parse_openai_response() {
        let json = serde_json::json!({
            "model": "gpt-4o-2024",
            "choices": [{"message": {"content": "hello"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        });
        let r = parse_openai_response(&json, "gpt-4o");
        assert_eq!(r.content, "hello");
        assert_eq!(r.model, "gpt-4o-2024");
        assert_eq!(r.prompt_tokens, 12);
    }

    #[test]
    fn test_api_error_message_lookup() {
        let body = serde_json::json!({"error": {"message": "bad key"}});
        match api_error(401, &body) {
            LlmError::ApiError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "bad key");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_sse_lines() {
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#),
            SseLine::Delta("Hi".into())
        );
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
        assert_eq!(parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#), SseLine::Skip);
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Skip);
        assert_eq!(parse_sse_line(""), SseLine::Skip);
    }

    #[tokio::test]
    async fn test_delta_stream_reassembles_split_chunks() {
        let chunks: Vec<Result<Vec<u8>, reqwest::Error>> = vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"Mal\"}}]}\n\ndata: {\"choi".to_vec()),
            Ok(b"ces\":[{\"delta\":{\"content\":\"aria\"}}]}\n\n".to_vec()),
            Ok(b"data: [DONE]\n\n".to_vec()),
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n".to_vec()),
        ];
        let deltas: Vec<String> = delta_stream(stream::iter(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(deltas, vec!["Mal", "aria"]);
    }

    #[tokio::test]
    async fn test_delta_stream_without_trailing_newline() {
        let chunks: Vec<Result<Vec<u8>, reqwest::Error>> =
            vec![Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"end\"}}]}".to_vec())];
        let deltas: Vec<String> = delta_stream(stream::iter(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(deltas, vec!["end"]);
    }
}
