//! Gemini SSE stream parser.

use std::collections::VecDeque;
use std::pin::Pin;

use eventsource_stream::{EventStream, Eventsource};
use futures_util::Stream;
use serde_json::Value;

use crate::providers::{ProviderError, ProviderErrorKind, ProviderResult, TextChunk};

/// Gemini SSE stream parser.
///
/// Parses Server-Sent Events from `streamGenerateContent?alt=sse` responses
/// and converts each JSON chunk into a `TextChunk`. Each chunk is an
/// independent delta; the parser does not accumulate.
pub struct GeminiSseParser<S> {
    inner: EventStream<S>,
    pending: VecDeque<ProviderResult<TextChunk>>,
    finish_reason: Option<String>,
}

impl<S> GeminiSseParser<S> {
    pub fn new(stream: S) -> Self
    where
        S: Eventsource,
    {
        Self {
            inner: stream.eventsource(),
            pending: VecDeque::new(),
            finish_reason: None,
        }
    }

    /// Finish reason reported by the last candidate, if any.
    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    fn handle_event_data(&mut self, data: &str) -> ProviderResult<()> {
        let trimmed = data.trim();
        if trimmed.is_empty() || trimmed == "[DONE]" {
            return Ok(());
        }

        let value = serde_json::from_str::<Value>(trimmed).map_err(|err| {
            ProviderError::new(
                ProviderErrorKind::Parse,
                format!("Failed to parse SSE JSON: {err}"),
            )
        })?;
        self.handle_chunk(&value);
        Ok(())
    }

    fn handle_chunk(&mut self, value: &Value) {
        if let Some(error) = value.get("error") {
            let error_type = error
                .get("status")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .or_else(|| error.get("code").map(ToString::to_string))
                .unwrap_or_else(|| "error".to_string());
            let message = error
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error");
            self.pending
                .push_back(Err(ProviderError::api_error(&error_type, message)));
            return;
        }

        let Some(candidate) = value
            .get("candidates")
            .and_then(|v| v.as_array())
            .and_then(|candidates| candidates.first())
        else {
            self.pending.push_back(Ok(TextChunk::empty()));
            return;
        };

        if let Some(reason) = candidate.get("finishReason").and_then(|v| v.as_str()) {
            self.finish_reason = Some(reason.to_string());
        }

        let mut combined_text = String::new();
        let mut saw_text = false;
        if let Some(parts) = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(|v| v.as_array())
        {
            for part in parts {
                let is_thought = part
                    .get("thought")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                if !is_thought && let Some(text) = part.get("text").and_then(|v| v.as_str()) {
                    combined_text.push_str(text);
                    saw_text = true;
                }
            }
        }

        let chunk = if saw_text {
            TextChunk::text(combined_text)
        } else {
            TextChunk::empty()
        };
        self.pending.push_back(Ok(chunk));
    }
}

impl<S, E> Stream for GeminiSseParser<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = ProviderResult<TextChunk>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        loop {
            if let Some(item) = self.pending.pop_front() {
                return Poll::Ready(Some(item));
            }

            let inner = Pin::new(&mut self.inner);
            match inner.poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if let Err(err) = self.handle_event_data(&event.data) {
                        return Poll::Ready(Some(Err(err)));
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(ProviderError::new(
                        ProviderErrorKind::Parse,
                        format!("SSE stream error: {e}"),
                    ))));
                }
                Poll::Ready(None) => {
                    tracing::debug!(
                        finish_reason = self.finish_reason.as_deref().unwrap_or("none"),
                        "Gemini stream ended"
                    );
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
