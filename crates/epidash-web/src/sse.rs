//! Server-Sent Events (SSE) streaming of chat replies.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use epidash_llm::TokenStream;
use serde_json::json;
use tokio_stream::{Stream, StreamExt};

/// Wrap model deltas as `data: {"content": "..."}` events. A failure
/// mid-stream is sent as `data: {"error": "..."}` and ends the stream.
pub fn chat_events(tokens: TokenStream) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = tokens.map(|delta| {
        let payload = match delta {
            Ok(content) => json!({ "content": content }),
            Err(e) => {
                tracing::warn!(error = %e, "chat stream failed");
                json!({ "error": "stream interrupted" })
            }
        };
        Ok(Event::default().data(payload.to_string()))
    });

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
