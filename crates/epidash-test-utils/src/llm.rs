//! Scripted language model for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use epidash_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse, TokenStream};
use futures_util::stream;

/// Replies from a queue (falling back to a default reply) and records every
/// request it receives.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, String>>>,
    default_reply: String,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedBackend {
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: default_reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
        self
    }

    /// Queue an upstream failure.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Err(message.into()));
        self
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, req: LlmRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(req);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(LlmError::ApiError { status: 500, message }),
            None => Ok(self.default_reply.clone()),
        }
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let content = self.next_reply(req)?;
        Ok(LlmResponse {
            content,
            model: "scripted".to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }

    /// Streams the reply one whitespace-separated word at a time.
    async fn complete_stream(&self, req: LlmRequest) -> Result<TokenStream, LlmError> {
        let content = self.next_reply(req)?;
        let words: Vec<Result<String, LlmError>> = content
            .split_inclusive(' ')
            .map(|w| Ok(w.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(words)))
    }

    fn model_id(&self) -> &str { "scripted" }
    fn is_local(&self) -> bool { true }
}
