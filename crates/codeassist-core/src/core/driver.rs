//! Streaming request driver.
//!
//! Runs one generation request against a `ModelClient` and reports its
//! progress as `ChatEvent`s over an unbounded channel. The caller owns all
//! conversation state; the driver only produces events.

use std::future::Future;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::events::ChatEvent;
use crate::providers::{GenerateRequest, ProviderError, ProviderResult, TextStream};

/// Sender half of the event channel.
pub type EventSender = mpsc::UnboundedSender<ChatEvent>;

/// A backend that can stream a generated reply.
pub trait ModelClient: Send + Sync {
    /// Opens a response stream for `request`.
    ///
    /// Resolves once the stream is open (response headers received), or
    /// with an error if the request could not be sent or was rejected.
    fn stream_generate(
        &self,
        request: GenerateRequest,
    ) -> impl Future<Output = ProviderResult<TextStream>> + Send;
}

/// Sends `Finished` when dropped, including during unwinding.
struct FinishGuard {
    tx: EventSender,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(ChatEvent::Finished);
    }
}

/// Runs `request` to completion, emitting events on `tx`.
///
/// Emits `StreamOpened`, a `Delta` per chunk with non-empty text, one of
/// `Completed`/`Failed`, then `Finished`. Errors are logged and reported as
/// `Failed`, never returned and never retried. A dropped receiver is ignored.
pub async fn run_request<C: ModelClient>(client: &C, request: GenerateRequest, tx: EventSender) {
    let _finish = FinishGuard { tx: tx.clone() };
    let model = request.model.clone();

    match stream_response(client, request, &tx).await {
        Ok(()) => {
            tracing::debug!(%model, "stream completed");
            let _ = tx.send(ChatEvent::Completed);
        }
        Err(error) => {
            log_failure(&model, &error);
            let _ = tx.send(ChatEvent::Failed { error });
        }
    }
}

/// Spawns `run_request` on the current tokio runtime.
pub fn spawn_request<C>(client: Arc<C>, request: GenerateRequest, tx: EventSender) -> JoinHandle<()>
where
    C: ModelClient + 'static,
{
    tokio::spawn(async move { run_request(client.as_ref(), request, tx).await })
}

async fn stream_response<C: ModelClient>(
    client: &C,
    request: GenerateRequest,
    tx: &EventSender,
) -> ProviderResult<()> {
    let mut stream = client.stream_generate(request).await?;
    let _ = tx.send(ChatEvent::StreamOpened);

    while let Some(chunk) = stream.next().await {
        if let Some(text) = chunk?.text.filter(|text| !text.is_empty()) {
            let _ = tx.send(ChatEvent::Delta { text });
        }
    }

    Ok(())
}

fn log_failure(model: &str, error: &ProviderError) {
    tracing::error!(
        model,
        kind = %error.kind,
        retryable = error.kind.is_retryable(),
        details = error.details.as_deref().unwrap_or(""),
        "request failed: {}",
        error.message
    );
}
